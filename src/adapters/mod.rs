//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to the hosted backend:
//! - `rest` - Production REST implementations of the backend ports
//! - `memory` - In-process emulations for testing and development

pub mod memory;
pub mod rest;

pub use memory::{MemoryBackend, MemoryPendingSignups};
pub use rest::{RestBackend, RestBackendConfig};
