use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::gateway::{ApiClient, Endpoint};
use crate::models::{BaseSnapshot, PoolMetadata, TokenBaseSnapshots, TokenPools};
use crate::validation::Arguments;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMetadataRequest {
    pub pool_address: String,
}

impl PoolMetadataRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        Ok(PoolMetadataRequest {
            pool_address: args.required_str("pool_address")?,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("pool")
            .segment(&self.pool_address)
            .segment("metadata")
    }
}

/// Shared by the token pools and token base snapshot tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub token_address: String,
}

impl TokenRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        Ok(TokenRequest {
            token_address: args.required_str("token_address")?,
        })
    }

    pub fn pools_endpoint(&self) -> Endpoint {
        Endpoint::new("token")
            .segment(&self.token_address)
            .segment("pools")
    }

    pub fn base_snapshots_endpoint(&self) -> Endpoint {
        Endpoint::new("snapshot")
            .segment("base_all_pools")
            .segment(&self.token_address)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseSnapshotRequest {
    pub pool_address: String,
    pub block_number: Option<u64>,
}

impl BaseSnapshotRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        Ok(BaseSnapshotRequest {
            pool_address: args.required_str("pool_address")?,
            block_number: args.optional_u64("block_number")?,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("snapshot")
            .segment("base")
            .segment(&self.pool_address)
            .segment_opt(self.block_number)
    }
}

/// Pool metadata and per-pool snapshot tools.
pub struct PoolTool {
    client: ApiClient,
}

impl PoolTool {
    pub fn new(client: ApiClient) -> Self {
        PoolTool { client }
    }

    /// Token pair, fee tier and factory of a pool.
    pub async fn get_pool_metadata(&self, request: PoolMetadataRequest) -> Result<PoolMetadata> {
        debug!("Fetching pool metadata: {}", request.pool_address);
        self.client.fetch(&request.endpoint()).await
    }

    /// All pools containing a token, keyed by pool address.
    pub async fn get_token_pools(&self, request: TokenRequest) -> Result<TokenPools> {
        debug!("Fetching pools for token: {}", request.token_address);

        let pools: TokenPools = self.client.fetch(&request.pools_endpoint()).await?;

        info!(
            "Token {} trades in {} pools",
            request.token_address,
            pools.pools.len()
        );
        Ok(pools)
    }

    pub async fn get_token_base_snapshots(
        &self,
        request: TokenRequest,
    ) -> Result<TokenBaseSnapshots> {
        debug!("Fetching base snapshots for token: {}", request.token_address);
        self.client.fetch(&request.base_snapshots_endpoint()).await
    }

    /// Latest base snapshot of a pool, or the one covering `block_number`.
    pub async fn get_base_snapshot(&self, request: BaseSnapshotRequest) -> Result<BaseSnapshot> {
        debug!(
            "Fetching base snapshot: pool={}, block={:?}",
            request.pool_address, request.block_number
        );
        self.client.fetch(&request.endpoint()).await
    }
}
