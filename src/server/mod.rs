pub mod http;
pub mod mcp;
pub mod stdio;

pub use mcp::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer};
