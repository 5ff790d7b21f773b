//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Hosted Backend Ports
//!
//! - `IdentityProvider` - Credential sign-up/sign-in/sign-out and
//!   verification-email dispatch
//! - `DocumentStore` - Document CRUD, atomic field patches, and queries
//!
//! ## Client-Local Ports
//!
//! - `PendingSignupStore` - Single-slot storage bridging sign-up and
//!   verification confirmation

mod document_store;
mod identity_provider;
mod pending_signup;

pub use document_store::{Direction, DocumentStore, FieldUpdate, Query, StoreError};
pub use identity_provider::{
    IdentityError, IdentityProvider, Password, ProviderSession, MIN_PASSWORD_LENGTH,
};
pub use pending_signup::{PendingSignup, PendingSignupError, PendingSignupStore};
