//! Core of the InfraNodus MCP adapter.
//!
//! A tool invocation flows through [`tools::ToolCall`]: inputs are validated,
//! turned into one [`request::GraphQueryRequest`], sent through a
//! [`gateway::GraphGateway`], and projected by [`transform`] into the tool's
//! structured output. [`stream`] wraps the same flow in progress checkpoints.

pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod request;
pub mod stream;
pub mod tools;
pub mod transform;

pub use config::ApiConfig;
pub use error::{NodusError, NodusResult, ValidationError};
pub use gateway::{GraphGateway, InfraNodusClient};
pub use model::GraphResponse;
pub use stream::{StreamEvent, StreamRegistry, StreamSession};
pub use tools::{ToolCall, ToolName, ToolOutput, execute};
