//! In-Memory Adapters
//!
//! Process-local implementations of the backend ports:
//!
//! - **MemoryBackend** - Emulates the hosted identity and document service
//!   (testing/development)
//! - **MemoryPendingSignups** - Holds the signup awaiting verification
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::memory::{MemoryBackend, MemoryPendingSignups};
//!
//! let backend = MemoryBackend::new();
//! let pending = MemoryPendingSignups::new();
//! ```

mod backend;
mod pending;

pub use backend::{MemoryBackend, MAX_FAILED_ATTEMPTS};
pub use pending::MemoryPendingSignups;
