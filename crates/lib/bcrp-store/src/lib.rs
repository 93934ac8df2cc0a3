//! Catalog models and schema constants for bcrp-mcp.
//!
//! This crate defines the data shapes shared by the metadata catalog, the
//! statistics client, and the renderers.

pub mod models;
pub mod schema;

pub use models::*;
