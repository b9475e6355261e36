//! MCP tool modules.
//!
//! Tools are grouped by what they read: ad-hoc text analysis, saved graphs in
//! the caller's account, and the search/fetch pair used by connectors.

pub mod analysis;
pub mod graphs;
pub mod search;
