use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, ToolError};
use crate::gateway::{ApiClient, Endpoint};
use crate::models::{AllTradesSnapshot, PoolTrades, TradeVolume, TradesSnapshot};
use crate::validation::Arguments;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradesSnapshotRequest {
    pub pool_address: String,
    pub block_number: Option<u64>,
}

impl TradesSnapshotRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        Ok(TradesSnapshotRequest {
            pool_address: args.required_str("pool_address")?,
            block_number: args.optional_u64("block_number")?,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("snapshot")
            .segment("trades")
            .segment(&self.pool_address)
            .segment_opt(self.block_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllTradesSnapshotRequest {
    pub block_number: Option<u64>,
}

impl AllTradesSnapshotRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        Ok(AllTradesSnapshotRequest {
            block_number: args.optional_u64("block_number")?,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("snapshot")
            .segment("allTrades")
            .segment_opt(self.block_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTradesRequest {
    pub pool_address: String,
    pub start_timestamp: u64,
    pub end_timestamp: u64,
}

impl PoolTradesRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        let pool_address = args.required_str("pool_address")?;
        let start_timestamp = args.required_u64("start_timestamp")?;
        let end_timestamp = args.required_u64("end_timestamp")?;

        if end_timestamp <= start_timestamp {
            return Err(ToolError::InvalidRange {
                param: "end_timestamp".to_string(),
                reason: format!(
                    "must be greater than start_timestamp ({}), got {}",
                    start_timestamp, end_timestamp
                ),
            });
        }

        Ok(PoolTradesRequest {
            pool_address,
            start_timestamp,
            end_timestamp,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("poolTrades")
            .segment(&self.pool_address)
            .segment(self.start_timestamp)
            .segment(self.end_timestamp)
    }
}

/// Which side of the volume aggregate the address names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeScope {
    Pool,
    TokenAllPools,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeVolumeRequest {
    pub scope: VolumeScope,
    pub address: String,
    pub time_interval: u64,
}

impl TradeVolumeRequest {
    pub fn for_pool(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        Ok(TradeVolumeRequest {
            scope: VolumeScope::Pool,
            address: args.required_str("pool_address")?,
            time_interval: args.time_interval("time_interval", None)?,
        })
    }

    pub fn for_token(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        Ok(TradeVolumeRequest {
            scope: VolumeScope::TokenAllPools,
            address: args.required_str("token_address")?,
            time_interval: args.time_interval("time_interval", None)?,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        let root = match self.scope {
            VolumeScope::Pool => "tradeVolume",
            VolumeScope::TokenAllPools => "tradeVolumeAllPools",
        };
        Endpoint::new(root)
            .segment(&self.address)
            .segment(self.time_interval)
    }
}

pub struct TradeTool {
    client: ApiClient,
}

impl TradeTool {
    pub fn new(client: ApiClient) -> Self {
        TradeTool { client }
    }

    /// Trades of one pool during the latest epoch, or the epoch covering `block_number`.
    pub async fn get_trades_snapshot(
        &self,
        request: TradesSnapshotRequest,
    ) -> Result<TradesSnapshot> {
        debug!(
            "Fetching trades snapshot: pool={}, block={:?}",
            request.pool_address, request.block_number
        );

        let snapshot: TradesSnapshot = self.client.fetch(&request.endpoint()).await?;

        info!(
            "Pool {} had {} trades in epoch {}..{}",
            request.pool_address,
            snapshot.trades.len(),
            snapshot.epoch.begin,
            snapshot.epoch.end
        );
        Ok(snapshot)
    }

    pub async fn get_all_trades_snapshot(
        &self,
        request: AllTradesSnapshotRequest,
    ) -> Result<AllTradesSnapshot> {
        debug!("Fetching all-pools trades snapshot: block={:?}", request.block_number);
        self.client.fetch(&request.endpoint()).await
    }

    pub async fn get_pool_trades(&self, request: PoolTradesRequest) -> Result<PoolTrades> {
        debug!(
            "Fetching pool trades: pool={}, range={}..{}",
            request.pool_address, request.start_timestamp, request.end_timestamp
        );
        self.client.fetch(&request.endpoint()).await
    }

    /// Aggregated trade volume for a pool, or for a token across all its pools.
    pub async fn get_trade_volume(&self, request: TradeVolumeRequest) -> Result<TradeVolume> {
        debug!(
            "Fetching trade volume: {:?} {} over {}s",
            request.scope, request.address, request.time_interval
        );
        self.client.fetch(&request.endpoint()).await
    }
}
