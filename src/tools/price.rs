use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, ToolError};
use crate::gateway::{ApiClient, Endpoint};
use crate::models::{EthPrice, TokenPrice, TokenPriceAll, TokenPriceSeries};
use crate::validation::{check_range, Arguments};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthPriceRequest {
    pub block_number: Option<u64>,
}

impl EthPriceRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        Ok(EthPriceRequest {
            block_number: args.optional_u64("block_number")?,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("ethPrice").segment_opt(self.block_number)
    }
}

/// Price of a token in one pool. Needs a pool, a block, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPriceRequest {
    pub token_address: String,
    pub pool_address: Option<String>,
    pub block_number: Option<u64>,
}

impl PoolPriceRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        let token_address = args.required_str("token_address")?;
        let pool_address = args.optional_str("pool_address")?;
        let block_number = args.optional_u64("block_number")?;

        if pool_address.is_none() && block_number.is_none() {
            return Err(ToolError::MissingParameter(
                "pool_address or block_number".to_string(),
            ));
        }

        Ok(PoolPriceRequest {
            token_address,
            pool_address,
            block_number,
        })
    }

    /// Pool-only and pool+block use path segments. Block-only has no documented upstream
    /// route; `/token/price/{token}?block_number={n}` is an assumption and should be
    /// confirmed against the Snapshotter Core API before relying on it.
    pub fn endpoint(&self) -> Endpoint {
        let base = Endpoint::new("token")
            .segment("price")
            .segment(&self.token_address);

        match (&self.pool_address, self.block_number) {
            (Some(pool), block) => base.segment(pool).segment_opt(block),
            (None, Some(block)) => base.query("block_number", block),
            (None, None) => base,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPriceAllRequest {
    pub token_address: String,
    pub block_number: Option<u64>,
}

impl TokenPriceAllRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        Ok(TokenPriceAllRequest {
            token_address: args.required_str("token_address")?,
            block_number: args.optional_u64("block_number")?,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("tokenPrices")
            .segment("all")
            .segment(&self.token_address)
            .segment_opt(self.block_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSeriesRequest {
    pub token_address: String,
    pub pool_address: String,
    pub time_interval: u64,
    pub step_seconds: u64,
}

impl PriceSeriesRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        let token_address = args.required_str("token_address")?;
        let pool_address = args.required_str("pool_address")?;
        let time_interval = args.time_interval("time_interval", None)?;
        let step_seconds = check_range(
            "step_seconds",
            args.required_u64("step_seconds")?,
            1,
            time_interval,
        )?;

        Ok(PriceSeriesRequest {
            token_address,
            pool_address,
            time_interval,
            step_seconds,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("timeSeries")
            .segment(&self.token_address)
            .segment(&self.pool_address)
            .segment(self.time_interval)
            .segment(self.step_seconds)
    }
}

pub struct PriceTool {
    client: ApiClient,
}

impl PriceTool {
    pub fn new(client: ApiClient) -> Self {
        PriceTool { client }
    }

    /// ETH price snapshot at `block_number`, or for the latest finalized epoch.
    pub async fn get_ethprice(&self, request: EthPriceRequest) -> Result<EthPrice> {
        debug!("Fetching ETH price: block={:?}", request.block_number);
        self.client.fetch(&request.endpoint()).await
    }

    pub async fn get_token_price_pool(&self, request: PoolPriceRequest) -> Result<TokenPrice> {
        debug!(
            "Fetching token price: token={}, pool={:?}, block={:?}",
            request.token_address, request.pool_address, request.block_number
        );

        let price: TokenPrice = self.client.fetch(&request.endpoint()).await?;

        info!("Price of {}: {}", request.token_address, price.0);
        Ok(price)
    }

    /// Price of a token in every pool it trades in.
    pub async fn get_token_price_all(&self, request: TokenPriceAllRequest) -> Result<TokenPriceAll> {
        debug!(
            "Fetching token price across pools: token={}, block={:?}",
            request.token_address, request.block_number
        );
        self.client.fetch(&request.endpoint()).await
    }

    pub async fn get_token_price_series(
        &self,
        request: PriceSeriesRequest,
    ) -> Result<TokenPriceSeries> {
        debug!(
            "Fetching price series: token={}, pool={}, interval={}s, step={}s",
            request.token_address, request.pool_address, request.time_interval, request.step_seconds
        );

        let series: TokenPriceSeries = self.client.fetch(&request.endpoint()).await?;

        info!(
            "Price series for {} has {} points",
            request.token_address,
            series.price_series.len()
        );
        Ok(series)
    }
}
