pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod server;
pub mod tools;
pub mod validation;

pub use config::Config;
pub use error::{Result, ToolError};
pub use gateway::ApiClient;
pub use server::McpServer;
pub use tools::{tool_definitions, ToolSet};
