use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Upstream service health. Diagnostic fields beyond `status` are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentEpoch {
    pub begin: u64,
    pub end: u64,
    pub epoch_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochInfo {
    pub timestamp: u64,
    #[serde(rename = "blocknumber")]
    pub block_number: u64,
    pub epoch_end: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastFinalizedEpoch {
    pub epoch_id: u64,
    pub timestamp: u64,
    #[serde(rename = "blocknumber")]
    pub block_number: u64,
    pub epoch_end: u64,
}

/// IPFS content identifier of a finalized snapshot, returned as a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalizedCid(pub String);
