use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::common::{Epoch, TokenMetadata};

/// Uniswap-style pool metadata. `token0`/`token1` keep the upstream ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMetadata {
    pub address: String,
    pub token0: TokenMetadata,
    pub token1: TokenMetadata,
    /// Fee tier in hundredths of a basis point (3000 = 0.3%).
    pub fee: u32,
    pub factory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPools {
    pub pools: BTreeMap<String, PoolMetadata>,
}

/// Base snapshots for one token, keyed by pool address. The per-pool payload is passed
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenBaseSnapshots(pub BTreeMap<String, Value>);

/// Per-epoch pool state: reserves, prices, volumes and fees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseSnapshot {
    pub address: String,
    pub epoch: Epoch,
    pub timestamps: BTreeMap<String, u64>,
    pub token0: String,
    pub token1: String,
    pub token0_reserves: BTreeMap<String, f64>,
    pub token1_reserves: BTreeMap<String, f64>,
    #[serde(rename = "token0ReservesUSD")]
    pub token0_reserves_usd: BTreeMap<String, f64>,
    #[serde(rename = "token1ReservesUSD")]
    pub token1_reserves_usd: BTreeMap<String, f64>,
    pub token0_prices: BTreeMap<String, f64>,
    pub token1_prices: BTreeMap<String, f64>,
    #[serde(rename = "token0PricesUSD")]
    pub token0_prices_usd: BTreeMap<String, f64>,
    #[serde(rename = "token1PricesUSD")]
    pub token1_prices_usd: BTreeMap<String, f64>,
    pub total_trade: f64,
    pub total_trade_mint_burn: f64,
    pub total_fee: f64,
    pub token0_mint_burn_volume: f64,
    pub token1_mint_burn_volume: f64,
    #[serde(rename = "token0MintBurnVolumeUSD")]
    pub token0_mint_burn_volume_usd: f64,
    #[serde(rename = "token1MintBurnVolumeUSD")]
    pub token1_mint_burn_volume_usd: f64,
    pub token0_trade_volume: f64,
    pub token1_trade_volume: f64,
    #[serde(rename = "token0TradeVolumeUSD")]
    pub token0_trade_volume_usd: f64,
    #[serde(rename = "token1TradeVolumeUSD")]
    pub token1_trade_volume_usd: f64,
    pub previous_snapshots: Vec<Value>,
}

/// Finalized snapshot data for a `(project_id, epoch_id)` pair. Shares the base snapshot shape.
pub type ProjectEpochData = BaseSnapshot;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assert_roundtrip;
    use serde_json::json;

    #[test]
    fn test_pool_metadata_preserves_token_order() {
        let pool: PoolMetadata =
            serde_json::from_value(fixtures::pool_metadata("0xpool")).unwrap();
        assert_eq!(pool.token0.symbol, "USDC");
        assert_eq!(pool.token1.symbol, "WETH");
        assert_eq!(pool.fee, 3000);
    }

    #[test]
    fn test_empty_token_pools_is_valid() {
        let pools: TokenPools = serde_json::from_str(r#"{"pools": {}}"#).unwrap();
        assert!(pools.pools.is_empty());
    }

    #[test]
    fn test_base_snapshot_usd_field_names() {
        let snapshot: BaseSnapshot =
            serde_json::from_value(fixtures::base_snapshot("0xpool")).unwrap();
        assert_eq!(snapshot.token1_prices_usd["block22844810"], 2499.86);
        assert_eq!(snapshot.token0_prices["block22844810"], 0.000400022);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(value.get("token0ReservesUSD").is_some());
        assert!(value.get("token1TradeVolumeUSD").is_some());
        assert!(value.get("token0ReservesUsd").is_none());
    }

    #[test]
    fn test_pool_models_roundtrip() {
        assert_roundtrip::<PoolMetadata>(&fixtures::pool_metadata("0xpool"));
        assert_roundtrip::<TokenPools>(&json!({
            "pools": {
                "0xaaa": fixtures::pool_metadata("0xaaa"),
                "0xbbb": fixtures::pool_metadata("0xbbb")
            }
        }));
        assert_roundtrip::<BaseSnapshot>(&fixtures::base_snapshot("0xpool"));
    }
}
