//! Typed projections of Snapshotter Core API payloads.
//!
//! Every model is decoded fresh per request. Field names follow the upstream JSON exactly;
//! maps are key-ordered so re-serialization is deterministic.

pub mod activity;
pub mod common;
pub mod epochs;
pub mod pools;
pub mod prices;
pub mod trades;

pub use activity::{ActivePool, ActiveToken, DailyActivePools, DailyActiveTokens, Pagination};
pub use common::{Epoch, TokenMetadata};
pub use epochs::{CurrentEpoch, EpochInfo, FinalizedCid, HealthStatus, LastFinalizedEpoch};
pub use pools::{BaseSnapshot, PoolMetadata, ProjectEpochData, TokenBaseSnapshots, TokenPools};
pub use prices::{EthPrice, PriceSeriesEntry, TokenPrice, TokenPriceAll, TokenPriceSeries};
pub use trades::{AllTradesSnapshot, Log, PoolTrades, Trade, TradeData, TradeVolume, TradesSnapshot};

/// Decodes `expected` through the gateway decoder and checks that serializing the model
/// reproduces it exactly.
#[cfg(test)]
pub(crate) fn assert_roundtrip<T>(expected: &serde_json::Value)
where
    T: serde::de::DeserializeOwned + serde::Serialize,
{
    let model: T = crate::gateway::decode(expected.to_string().as_bytes()).unwrap();
    assert_eq!(&serde_json::to_value(&model).unwrap(), expected);
}
