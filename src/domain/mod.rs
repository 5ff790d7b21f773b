//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `user` - User profile record and college affiliation
//! - `question` - Question aggregate with embedded answers
//! - `session` - Authenticated identity and auth errors
//! - `activity` - Append-only activity log records
//! - `category` - Category registry document

pub mod activity;
pub mod category;
pub mod foundation;
pub mod question;
pub mod session;
pub mod user;
