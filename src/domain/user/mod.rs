//! User module - profile records and affiliation.
//!
//! The profile is the per-account document the rest of the system joins
//! against: display names for question feeds, counters for stats, and the
//! upvote membership set that enforces at-most-once upvoting.

mod profile;

pub use profile::{CollegeAffiliation, UserProfile, DEFAULT_ROLE};
