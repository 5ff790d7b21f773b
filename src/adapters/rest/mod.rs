//! REST Adapters
//!
//! Production implementations of the backend ports over the hosted
//! service's REST API:
//!
//! - **RestBackend** - `IdentityProvider` and `DocumentStore` over HTTPS

mod backend;

pub use backend::{RestBackend, RestBackendConfig};
