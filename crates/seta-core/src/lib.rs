//! Core types and the report aggregator for SETA verification reporting.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

pub mod config;
pub mod error;
pub mod id_number;
pub mod period;
pub mod record;
pub mod report;
pub mod source;

pub use error::{Error, Result};
pub use report::aggregate;
