//! DoubtSolver - Campus Q&A Data Layer
//!
//! This crate implements the data-access and session layer for the
//! DoubtSolver campus Q&A application over a hosted identity and
//! document backend.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
