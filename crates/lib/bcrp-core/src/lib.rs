//! Core services for bcrp-mcp.
//!
//! This crate resolves free-text queries to BCRP series codes, owns the
//! metadata catalog and its search corpus, fetches observations from the
//! statistics API, and renders tables and charts. [`control::BcrpControlPlane`]
//! ties these together for the MCP layer.

pub mod catalog;
pub mod client;
pub mod control;
pub mod render;
pub mod search;
