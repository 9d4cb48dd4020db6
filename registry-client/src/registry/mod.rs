//! # Registry Client
//!
//! Facade over the device registry REST surface. Every operation follows the
//! same pattern:
//!
//! 1. Validate arguments synchronously. A malformed call returns an
//!    [`ArgumentError`] immediately and never reaches the transport.
//! 2. Normalize and shape the request (method, path, headers, body).
//! 3. Return a future that delegates to the injected [`RestExecutor`] and maps
//!    the response into a typed result. Operational errors from the executor
//!    are forwarded unchanged.
//!
//! ```ignore
//! let device = registry.create(&json!({ "deviceId": "sensor-1" }))?.await?;
//! ```

mod validation;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use shared::{
    config::RegistryConfig,
    constants::*,
    error::{ArgumentResult, RegistryResult},
    types::{BulkRegistryOperationResult, ImportMode, Job, JobCreationRequest, JobType, RegistryStatistics},
};

use crate::normalize::{normalize, to_import_export_entry};
use crate::query::{PageSource, Query};
use crate::transport::{HttpExecutor, Method, ResponseBody, RestExecutor, RestRequest, TransportResponse};
use crate::twin::Twin;

/// Client for a device registry
pub struct Registry {
    /// Connection descriptor, immutable after construction
    config: Arc<RegistryConfig>,

    /// Injected REST capability
    executor: Arc<dyn RestExecutor>,
}

impl Registry {
    /// Create a registry over an injected executor
    pub fn new(config: RegistryConfig, executor: Arc<dyn RestExecutor>) -> ArgumentResult<Self> {
        config.validate()?;

        info!(host = %config.host, api_version = %config.api_version, "Initializing registry client");

        Ok(Self {
            config: Arc::new(config),
            executor,
        })
    }

    /// Create a registry that talks HTTP through [`HttpExecutor`]
    pub fn from_config(config: RegistryConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let executor = HttpExecutor::new(&config)?;
        Ok(Self::new(config, Arc::new(executor))?)
    }

    /// The connection descriptor captured at construction
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // =========================================================================
    // DEVICE IDENTITIES
    // =========================================================================

    /// Register a new device identity (`PUT /devices/{id}`).
    ///
    /// Resolves to the identity record returned by the service.
    pub fn create(
        &self,
        identity: &Value,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<Value>> + Send + 'static> {
        self.put_identity(identity)
    }

    /// Replace an existing device identity (`PUT /devices/{id}`)
    pub fn update(
        &self,
        identity: &Value,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<Value>> + Send + 'static> {
        self.put_identity(identity)
    }

    fn put_identity(
        &self,
        identity: &Value,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<Value>> + Send + 'static> {
        let device_id = validation::require_identity(identity)?;

        let request = RestRequest::new(Method::Put, self.device_path(device_id))
            .with_json_body(normalize(identity));

        let call = self.dispatch(request);
        Ok(async move {
            let (body, _) = call.await?;
            body.into_json()
        })
    }

    /// Fetch a device identity (`GET /devices/{id}`)
    pub fn get(
        &self,
        device_id: &str,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<Value>> + Send + 'static> {
        let device_id = validation::require_str(device_id, "deviceId")?;

        let call = self.dispatch(RestRequest::new(Method::Get, self.device_path(device_id)));
        Ok(async move {
            let (body, _) = call.await?;
            body.into_json()
        })
    }

    /// List device identities (`GET /devices`)
    pub fn list(&self) -> impl Future<Output = RegistryResult<Vec<Value>>> + Send + 'static {
        let call = self.dispatch(RestRequest::new(Method::Get, self.path(DEVICES_PATH)));
        async move {
            let (body, _) = call.await?;
            Ok(parse::<Option<Vec<Value>>>(body)?.unwrap_or_default())
        }
    }

    /// Unconditionally delete a device identity (`DELETE /devices/{id}`).
    ///
    /// Resolves to the transport response only.
    pub fn delete(
        &self,
        device_id: &str,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<TransportResponse>> + Send + 'static> {
        let device_id = validation::require_str(device_id, "deviceId")?;

        let request = RestRequest::new(Method::Delete, self.device_path(device_id))
            .with_header(HEADER_IF_MATCH, ETAG_WILDCARD);

        let call = self.dispatch(request);
        Ok(async move {
            let (_, response) = call.await?;
            Ok(response)
        })
    }

    // =========================================================================
    // TWINS
    // =========================================================================

    /// Fetch a device twin (`GET /twins/{id}`)
    pub fn get_twin(
        &self,
        device_id: &str,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<(Twin, TransportResponse)>> + Send + 'static> {
        let device_id = validation::require_str(device_id, "deviceId")?;

        let call = self.dispatch(RestRequest::new(Method::Get, self.twin_path(device_id)));
        Ok(async move {
            let (body, response) = call.await?;
            Ok((Twin::from_body(body)?, response))
        })
    }

    /// Apply a patch to a device twin if its etag still matches
    /// (`PATCH /twins/{id}`)
    pub fn update_twin(
        &self,
        device_id: &str,
        patch: &Value,
        etag: &str,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<(Twin, TransportResponse)>> + Send + 'static> {
        let device_id = validation::require_str(device_id, "deviceId")?;
        validation::require_document(patch, "patch")?;
        let etag = validation::require_str(etag, "etag")?;

        let request = RestRequest::new(Method::Patch, self.twin_path(device_id))
            .with_header(HEADER_IF_MATCH, etag)
            .with_json_body(patch.clone());

        let call = self.dispatch(request);
        Ok(async move {
            let (body, response) = call.await?;
            Ok((Twin::from_body(body)?, response))
        })
    }

    // =========================================================================
    // BULK OPERATIONS
    // =========================================================================

    /// Create up to 100 identities in one request
    pub fn add_devices(
        &self,
        devices: &Value,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<BulkRegistryOperationResult>> + Send + 'static> {
        let devices = validation::require_devices(devices)?;
        Ok(self.submit_bulk(devices, ImportMode::Create))
    }

    /// Update up to 100 identities; without `force` each update is
    /// conditional on the identity's etag
    pub fn update_devices(
        &self,
        devices: &Value,
        force: Option<bool>,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<BulkRegistryOperationResult>> + Send + 'static> {
        let devices = validation::require_devices(devices)?;
        let mode = if validation::require_force(force)? {
            ImportMode::Update
        } else {
            ImportMode::UpdateIfMatchETag
        };
        Ok(self.submit_bulk(devices, mode))
    }

    /// Remove up to 100 identities; without `force` each removal is
    /// conditional on the identity's etag
    pub fn remove_devices(
        &self,
        devices: &Value,
        force: Option<bool>,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<BulkRegistryOperationResult>> + Send + 'static> {
        let devices = validation::require_devices(devices)?;
        let mode = if validation::require_force(force)? {
            ImportMode::Delete
        } else {
            ImportMode::DeleteIfMatchETag
        };
        Ok(self.submit_bulk(devices, mode))
    }

    fn submit_bulk(
        &self,
        devices: &[Value],
        mode: ImportMode,
    ) -> impl Future<Output = RegistryResult<BulkRegistryOperationResult>> + Send + 'static {
        let entries: Vec<Value> = devices
            .iter()
            .map(|device| to_import_export_entry(device, mode))
            .collect();

        info!(count = entries.len(), import_mode = %mode, "Submitting bulk registry operation");

        let request = RestRequest::new(Method::Post, self.path(DEVICES_PATH))
            .with_json_body(Value::Array(entries));

        let call = self.dispatch(request);
        async move {
            let (body, _) = call.await?;
            // An empty 2xx body carries no per-device errors
            Ok(parse::<Option<BulkRegistryOperationResult>>(body)?.unwrap_or(
                BulkRegistryOperationResult {
                    is_successful: true,
                    ..Default::default()
                },
            ))
        }
    }

    // =========================================================================
    // IMPORT / EXPORT JOBS
    // =========================================================================

    /// Start a job importing identities from a blob container
    pub fn import_devices_from_blob(
        &self,
        input_blob_container_uri: &str,
        output_blob_container_uri: &str,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<Job>> + Send + 'static> {
        let input = validation::require_str(input_blob_container_uri, "inputBlobContainerUri")?;
        let output = validation::require_str(output_blob_container_uri, "outputBlobContainerUri")?;

        Ok(self.create_job(JobCreationRequest {
            job_type: JobType::Import,
            input_blob_container_uri: Some(input.to_string()),
            output_blob_container_uri: output.to_string(),
            exclude_keys_in_export: None,
        }))
    }

    /// Start a job exporting identities to a blob container
    pub fn export_devices_to_blob(
        &self,
        output_blob_container_uri: &str,
        exclude_keys: bool,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<Job>> + Send + 'static> {
        let output = validation::require_str(output_blob_container_uri, "outputBlobContainerUri")?;

        Ok(self.create_job(JobCreationRequest {
            job_type: JobType::Export,
            input_blob_container_uri: None,
            output_blob_container_uri: output.to_string(),
            exclude_keys_in_export: Some(exclude_keys),
        }))
    }

    fn create_job(
        &self,
        job: JobCreationRequest,
    ) -> impl Future<Output = RegistryResult<Job>> + Send + 'static {
        info!(job_type = ?job.job_type, output = %job.output_blob_container_uri, "Creating bulk job");

        let request = RestRequest::new(Method::Post, self.path(JOBS_CREATE_PATH))
            .with_json_body(job.to_value());

        let call = self.dispatch(request);
        async move {
            let (body, _) = call.await?;
            parse(body)
        }
    }

    /// List recent import/export jobs (`GET /jobs`)
    pub fn list_jobs(&self) -> impl Future<Output = RegistryResult<Vec<Job>>> + Send + 'static {
        let call = self.dispatch(RestRequest::new(Method::Get, self.path(JOBS_PATH)));
        async move {
            let (body, _) = call.await?;
            Ok(parse::<Option<Vec<Job>>>(body)?.unwrap_or_default())
        }
    }

    /// Fetch a job's status (`GET /jobs/{id}`)
    pub fn get_job(
        &self,
        job_id: &str,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<Job>> + Send + 'static> {
        let job_id = validation::require_str(job_id, "jobId")?;

        let call = self.dispatch(RestRequest::new(Method::Get, self.job_path(job_id)));
        Ok(async move {
            let (body, _) = call.await?;
            parse(body)
        })
    }

    /// Cancel a job (`DELETE /jobs/{id}`); resolves to the job when the
    /// service echoes it back
    pub fn cancel_job(
        &self,
        job_id: &str,
    ) -> ArgumentResult<impl Future<Output = RegistryResult<Option<Job>>> + Send + 'static> {
        let job_id = validation::require_str(job_id, "jobId")?;

        let call = self.dispatch(RestRequest::new(Method::Delete, self.job_path(job_id)));
        Ok(async move {
            let (body, _) = call.await?;
            parse(body)
        })
    }

    // =========================================================================
    // QUERIES & STATISTICS
    // =========================================================================

    /// Create a cursor over a SQL-like device query.
    ///
    /// No request is issued until the first `next()`.
    pub fn create_query(&self, sql: &str, page_size: Option<u32>) -> ArgumentResult<Query> {
        let sql = validation::require_str(sql, "sqlQuery")?;
        let page_size = validation::check_page_size(page_size)?;

        let source = DeviceQuerySource {
            executor: Arc::clone(&self.executor),
            path: self.path(DEVICES_QUERY_PATH),
        };

        Ok(Query::new(Arc::new(source), sql, page_size))
    }

    /// Fetch device counts (`GET /statistics/devices`)
    pub fn get_registry_statistics(
        &self,
    ) -> impl Future<Output = RegistryResult<RegistryStatistics>> + Send + 'static {
        let call = self.dispatch(RestRequest::new(Method::Get, self.path(STATISTICS_PATH)));
        async move {
            let (body, _) = call.await?;
            parse(body)
        }
    }

    // =========================================================================
    // REQUEST PLUMBING
    // =========================================================================

    fn path(&self, resource: &str) -> String {
        format!("{}{}", resource, self.config.version_query())
    }

    fn device_path(&self, device_id: &str) -> String {
        self.path(&format!("{}/{}", DEVICES_PATH, urlencoding::encode(device_id)))
    }

    fn twin_path(&self, device_id: &str) -> String {
        self.path(&format!("{}/{}", TWINS_PATH, urlencoding::encode(device_id)))
    }

    fn job_path(&self, job_id: &str) -> String {
        self.path(&format!("{}/{}", JOBS_PATH, urlencoding::encode(job_id)))
    }

    fn dispatch(
        &self,
        request: RestRequest,
    ) -> impl Future<Output = RegistryResult<(ResponseBody, TransportResponse)>> + Send + 'static {
        let executor = Arc::clone(&self.executor);
        async move { execute_logged(executor.as_ref(), request).await }
    }
}

/// Query page source backed by `POST /devices/query`
struct DeviceQuerySource {
    executor: Arc<dyn RestExecutor>,
    path: String,
}

#[async_trait]
impl PageSource for DeviceQuerySource {
    async fn fetch_page(
        &self,
        query: &str,
        continuation_token: Option<&str>,
        page_size: Option<u32>,
    ) -> RegistryResult<(ResponseBody, TransportResponse)> {
        let mut request = RestRequest::new(Method::Post, self.path.clone())
            .with_json_body(json!({ "query": query }));

        if let Some(token) = continuation_token {
            request = request.with_header(HEADER_CONTINUATION, token);
        }
        if let Some(page_size) = page_size {
            request = request.with_header(HEADER_MAX_ITEM_COUNT, page_size.to_string());
        }

        execute_logged(self.executor.as_ref(), request).await
    }
}

async fn execute_logged(
    executor: &dyn RestExecutor,
    request: RestRequest,
) -> RegistryResult<(ResponseBody, TransportResponse)> {
    let method = request.method;
    let path = request.path.clone();
    let request_id = request.header(HEADER_REQUEST_ID).unwrap_or_default().to_string();

    debug!(method = %method, path = %path, request_id = %request_id, "Dispatching registry request");

    executor.execute(request).await.map_err(|err| {
        warn!(
            method = %method,
            path = %path,
            request_id = %request_id,
            category = err.category(),
            error = %err,
            "Registry request failed"
        );
        err
    })
}

fn parse<T: DeserializeOwned>(body: ResponseBody) -> RegistryResult<T> {
    Ok(serde_json::from_value(body.into_json()?)?)
}
