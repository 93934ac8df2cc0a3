//! MCP tool modules.
//!
//! Tools are grouped by domain: series lookup against the metadata catalog,
//! observation retrieval and charting, and contextual help.

pub mod data;
pub mod search;
mod context;
