use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

/// Block range an upstream snapshot was computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epoch {
    pub begin: u64,
    pub end: u64,
    // Only populated by the current-epoch endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch_id: Option<u64>,
}
