use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::common::Epoch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthPrice {
    pub epoch: Epoch,
    pub eth_price: BTreeMap<String, f64>,
    pub previous_snapshots: Vec<Value>,
}

/// Price of a token inside a single pool, returned upstream as a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenPrice(pub f64);

/// Token price keyed by pool address; `None` where the pool has no price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenPriceAll(pub BTreeMap<String, Option<f64>>);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSeriesEntry {
    pub block_number: u64,
    pub price: f64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPriceSeries {
    /// Chronological, as returned upstream.
    pub price_series: Vec<PriceSeriesEntry>,
    pub time_interval: u64,
}
