use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use super::common::Epoch;

/// Raw event log a trade was decoded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: String,
    pub block_number: u64,
    pub data: String,
    pub event_name: String,
    pub filter_name: String,
    pub log_index: u64,
    pub topics: Vec<String>,
    pub transaction_hash: String,
    pub transaction_index: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeData {
    pub amount0: f64,
    pub amount1: f64,
    pub block_timestamp: u64,
    pub calculated_eth_price: f64,
    pub calculated_token0_amount: f64,
    pub calculated_token1_amount: f64,
    pub calculated_trade_amount_usd: f64,
    // uint128 / uint160 on chain. `arbitrary_precision` keeps every digit.
    pub liquidity: Number,
    pub recipient: String,
    pub sender: String,
    #[serde(rename = "sqrtPriceX96")]
    pub sqrt_price_x96: Number,
    pub tick: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub trade_type: String,
    pub log: Log,
    pub data: TradeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradesSnapshot {
    pub address: String,
    pub epoch: Epoch,
    pub trades: Vec<Trade>,
    pub previous_snapshots: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllTradesSnapshot {
    pub epoch: Epoch,
    pub trade_data: BTreeMap<String, TradesSnapshot>,
    pub previous_snapshots: Vec<Value>,
}

/// Trades in a pool over a timestamp range, upstream order preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolTrades(pub Vec<Map<String, Value>>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeVolume {
    pub total_trade_volume: f64,
    pub time_interval: u64,
}
