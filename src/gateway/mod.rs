pub mod client;
pub mod decode;

pub use client::{ApiClient, Endpoint};
pub use decode::decode;
