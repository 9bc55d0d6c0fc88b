//! services/client/src/lib.rs
//!
//! The HTTP side of the notes client: configuration, the reqwest adapters that
//! implement the core ports, and JSON export/import.

pub mod adapters;
pub mod config;
pub mod error;
pub mod transfer;
