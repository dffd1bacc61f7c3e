//! # domains
//!
//! Models, port traits and error types for the file-triage scanner and the
//! lost-and-found catalog. No I/O lives in this crate.

pub mod errors;
pub mod items;
pub mod models;
pub mod ports;

pub use errors::*;
pub use items::*;
pub use models::*;
pub use ports::*;
