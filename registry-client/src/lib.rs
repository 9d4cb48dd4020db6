//! # Registry Client for Device Identities
//!
//! This crate provides client-side registry management:
//! - Device identity create/read/update/delete with authentication normalization
//! - Bulk add/update/remove of up to 100 identities
//! - Device twin read and conditional patch
//! - Import/export job submission and tracking
//! - Paginated SQL-like queries with continuation tokens
//!
//! ## Transport
//!
//! Requests are shaped here and executed by an injected [`RestExecutor`].
//! [`HttpExecutor`] is the reqwest-backed default; tests and embedders can
//! supply their own.
//!
//! ## Errors
//!
//! Operations validate their arguments synchronously and return an
//! [`ArgumentError`](shared::ArgumentError) on a malformed call. Otherwise they
//! return a future resolving to the result or a
//! [`RegistryError`](shared::RegistryError) forwarded from the executor.

pub mod normalize;
pub mod query;
pub mod registry;
pub mod transport;
pub mod twin;

// Re-export commonly used types
pub use query::{PageSource, Query, QueryPage};
pub use registry::Registry;
pub use transport::{HttpExecutor, Method, ResponseBody, RestExecutor, RestRequest, TransportResponse};
pub use twin::{Twin, TwinProperties};
