pub mod activity;
pub mod epochs;
pub mod pools;
pub mod price;
pub mod trades;

pub use activity::ActivityTool;
pub use epochs::EpochTool;
pub use pools::PoolTool;
pub use price::PriceTool;
pub use trades::TradeTool;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::gateway::ApiClient;
use crate::validation::{Arguments, NAMED_INTERVALS};

use activity::ActivityRequest;
use epochs::{EpochInfoRequest, ProjectEpochRequest, ProjectRequest};
use pools::{BaseSnapshotRequest, PoolMetadataRequest, TokenRequest};
use price::{EthPriceRequest, PoolPriceRequest, PriceSeriesRequest, TokenPriceAllRequest};
use trades::{AllTradesSnapshotRequest, PoolTradesRequest, TradeVolumeRequest, TradesSnapshotRequest};

/// MCP tool definition as listed by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

/// Result of a `tools/call`, in MCP `CallToolResult` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub content: Vec<ToolContent>,
    pub structured_content: Value,
    pub is_error: bool,
}

impl ToolResponse {
    pub fn success(data: Value) -> Self {
        let text = data.to_string();
        let structured_content = match data {
            Value::Object(_) => data,
            other => json!({ "result": other }),
        };

        ToolResponse {
            content: vec![ToolContent::Text { text }],
            structured_content,
            is_error: false,
        }
    }

    pub fn error(err: &ToolError) -> Self {
        let mut error = json!({
            "kind": err.kind(),
            "message": err.to_string(),
            "retryable": err.is_retryable(),
        });
        if let Some(status) = err.status() {
            error["status"] = json!(status);
        }

        ToolResponse {
            content: vec![ToolContent::Text {
                text: format!("{}: {}", err.kind(), err),
            }],
            structured_content: json!({ "error": error }),
            is_error: true,
        }
    }
}

/// Every tool adapter, sharing one [`ApiClient`].
pub struct ToolSet {
    pools: PoolTool,
    price: PriceTool,
    trades: TradeTool,
    activity: ActivityTool,
    epochs: EpochTool,
}

impl ToolSet {
    pub fn new(client: ApiClient) -> Self {
        ToolSet {
            pools: PoolTool::new(client.clone()),
            price: PriceTool::new(client.clone()),
            trades: TradeTool::new(client.clone()),
            activity: ActivityTool::new(client.clone()),
            epochs: EpochTool::new(client),
        }
    }

    /// Validate `args`, call the tool named `name` and return its decoded payload as JSON.
    pub async fn call(&self, name: &str, args: &Value) -> Result<Value> {
        debug!("Calling tool {} with {}", name, args);

        match name {
            "get_pool_metadata" => to_json(
                self.pools
                    .get_pool_metadata(PoolMetadataRequest::from_args(args)?)
                    .await?,
            ),
            "get_token_pools" => to_json(
                self.pools
                    .get_token_pools(TokenRequest::from_args(args)?)
                    .await?,
            ),
            "get_token_base_snapshots" => to_json(
                self.pools
                    .get_token_base_snapshots(TokenRequest::from_args(args)?)
                    .await?,
            ),
            "get_base_snapshot" => to_json(
                self.pools
                    .get_base_snapshot(BaseSnapshotRequest::from_args(args)?)
                    .await?,
            ),
            "get_ethprice" => to_json(
                self.price
                    .get_ethprice(EthPriceRequest::from_args(args)?)
                    .await?,
            ),
            "get_token_price_pool" => to_json(
                self.price
                    .get_token_price_pool(PoolPriceRequest::from_args(args)?)
                    .await?,
            ),
            "get_token_price_all" => to_json(
                self.price
                    .get_token_price_all(TokenPriceAllRequest::from_args(args)?)
                    .await?,
            ),
            "get_token_price_series" => to_json(
                self.price
                    .get_token_price_series(PriceSeriesRequest::from_args(args)?)
                    .await?,
            ),
            "get_trades_snapshot" => to_json(
                self.trades
                    .get_trades_snapshot(TradesSnapshotRequest::from_args(args)?)
                    .await?,
            ),
            "get_all_trades_snapshot" => to_json(
                self.trades
                    .get_all_trades_snapshot(AllTradesSnapshotRequest::from_args(args)?)
                    .await?,
            ),
            "get_pool_trades" => to_json(
                self.trades
                    .get_pool_trades(PoolTradesRequest::from_args(args)?)
                    .await?,
            ),
            "get_trade_volume_agg" => to_json(
                self.trades
                    .get_trade_volume(TradeVolumeRequest::for_pool(args)?)
                    .await?,
            ),
            "get_trade_volume_agg_all_pools" => to_json(
                self.trades
                    .get_trade_volume(TradeVolumeRequest::for_token(args)?)
                    .await?,
            ),
            "get_daily_active_tokens" => to_json(
                self.activity
                    .get_daily_active_tokens(ActivityRequest::from_args(args)?)
                    .await?,
            ),
            "get_daily_active_pools" => to_json(
                self.activity
                    .get_daily_active_pools(ActivityRequest::from_args(args)?)
                    .await?,
            ),
            "health_check" => {
                Arguments::new(args)?;
                to_json(self.epochs.health_check().await?)
            }
            "get_current_epoch_data" => {
                Arguments::new(args)?;
                to_json(self.epochs.get_current_epoch_data().await?)
            }
            "get_epoch_info" => to_json(
                self.epochs
                    .get_epoch_info(EpochInfoRequest::from_args(args)?)
                    .await?,
            ),
            "get_project_last_finalized_epoch_info" => to_json(
                self.epochs
                    .get_project_last_finalized_epoch_info(ProjectRequest::from_args(args)?)
                    .await?,
            ),
            "get_data_for_project_id_epoch_id" => to_json(
                self.epochs
                    .get_data_for_project_id_epoch_id(ProjectEpochRequest::from_args(args)?)
                    .await?,
            ),
            "get_finalized_cid_for_project_id_epoch_id" => to_json(
                self.epochs
                    .get_finalized_cid_for_project_id_epoch_id(ProjectEpochRequest::from_args(
                        args,
                    )?)
                    .await?,
            ),
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ToolError::SchemaMismatch {
        path: "$".to_string(),
        message: format!("failed to re-encode decoded payload: {}", e),
    })
}

fn address(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn block_number() -> Value {
    json!({
        "type": "integer",
        "minimum": 0,
        "description": "Block number to query at (optional, defaults to the latest finalized epoch)"
    })
}

fn time_interval(description: &str) -> Value {
    let named: Vec<&str> = NAMED_INTERVALS.iter().map(|(label, _)| *label).collect();
    json!({
        "type": ["integer", "string"],
        "description": format!("{} (seconds, or one of: {})", description, named.join(", "))
    })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn definition(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// The 21 tools served by [`ToolSet::call`].
pub fn tool_definitions() -> Vec<ToolDefinition> {
    let pool = || address("Pool contract address (0x...)");
    let token = || address("Token contract address (0x...)");
    let activity = || {
        object(
            json!({
                "page": {"type": "integer", "minimum": 1, "maximum": 10000, "default": 1},
                "size": {"type": "integer", "minimum": 1, "maximum": 100, "default": 50},
                "metadata": {
                    "type": "boolean",
                    "default": false,
                    "description": "Include token or pool metadata in each entry"
                },
                "time_interval": time_interval("Lookback window, default 86400"),
            }),
            &[],
        )
    };
    let project_epoch = || {
        object(
            json!({
                "project_id": {"type": "string", "description": "Snapshotter project id"},
                "epoch_id": {"type": "integer", "minimum": 0},
            }),
            &["project_id", "epoch_id"],
        )
    };

    let mut pool_price = object(
        json!({
            "token_address": token(),
            "pool_address": pool(),
            "block_number": block_number(),
        }),
        &["token_address"],
    );
    pool_price["anyOf"] = json!([
        {"required": ["pool_address"]},
        {"required": ["block_number"]},
    ]);

    vec![
        definition(
            "get_pool_metadata",
            "Get token pair, fee tier and factory of a Uniswap V3 pool",
            object(json!({ "pool_address": pool() }), &["pool_address"]),
        ),
        definition(
            "get_token_pools",
            "List every pool that contains a token",
            object(json!({ "token_address": token() }), &["token_address"]),
        ),
        definition(
            "get_token_base_snapshots",
            "Get the latest base snapshot of every pool containing a token",
            object(json!({ "token_address": token() }), &["token_address"]),
        ),
        definition(
            "get_ethprice",
            "Get the ETH/USD price snapshot for the latest epoch or a given block",
            object(json!({ "block_number": block_number() }), &[]),
        ),
        definition(
            "get_token_price_pool",
            "Get a token's price in a pool. Requires pool_address, block_number, or both",
            pool_price,
        ),
        definition(
            "get_token_price_all",
            "Get a token's price in every pool it trades in",
            object(
                json!({ "token_address": token(), "block_number": block_number() }),
                &["token_address"],
            ),
        ),
        definition(
            "get_token_price_series",
            "Get a token's price time series in a pool",
            object(
                json!({
                    "token_address": token(),
                    "pool_address": pool(),
                    "time_interval": time_interval("Length of the series"),
                    "step_seconds": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Spacing between points, at most time_interval"
                    },
                }),
                &["token_address", "pool_address", "time_interval", "step_seconds"],
            ),
        ),
        definition(
            "get_trades_snapshot",
            "Get the trades of a pool for the latest epoch or the epoch covering a block",
            object(
                json!({ "pool_address": pool(), "block_number": block_number() }),
                &["pool_address"],
            ),
        ),
        definition(
            "get_all_trades_snapshot",
            "Get the trades of every tracked pool for the latest epoch or a given block",
            object(json!({ "block_number": block_number() }), &[]),
        ),
        definition(
            "get_pool_trades",
            "Get the trades of a pool between two unix timestamps",
            object(
                json!({
                    "pool_address": pool(),
                    "start_timestamp": {"type": "integer", "minimum": 0},
                    "end_timestamp": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Must be greater than start_timestamp"
                    },
                }),
                &["pool_address", "start_timestamp", "end_timestamp"],
            ),
        ),
        definition(
            "get_trade_volume_agg",
            "Get the aggregated trade volume of a pool over a time window",
            object(
                json!({
                    "pool_address": pool(),
                    "time_interval": time_interval("Aggregation window"),
                }),
                &["pool_address", "time_interval"],
            ),
        ),
        definition(
            "get_trade_volume_agg_all_pools",
            "Get the aggregated trade volume of a token across all its pools",
            object(
                json!({
                    "token_address": token(),
                    "time_interval": time_interval("Aggregation window"),
                }),
                &["token_address", "time_interval"],
            ),
        ),
        definition(
            "get_daily_active_tokens",
            "List the most traded tokens, paginated",
            activity(),
        ),
        definition(
            "get_daily_active_pools",
            "List the most traded pools, paginated",
            activity(),
        ),
        definition(
            "get_base_snapshot",
            "Get a pool's base snapshot: reserves, prices, volumes and fees",
            object(
                json!({ "pool_address": pool(), "block_number": block_number() }),
                &["pool_address"],
            ),
        ),
        definition(
            "health_check",
            "Check the health of the Snapshotter Core API",
            object(json!({}), &[]),
        ),
        definition(
            "get_current_epoch_data",
            "Get the block range and id of the current epoch",
            object(json!({}), &[]),
        ),
        definition(
            "get_epoch_info",
            "Get timestamp and block details of an epoch",
            object(
                json!({ "epoch_id": {"type": "integer", "minimum": 0} }),
                &["epoch_id"],
            ),
        ),
        definition(
            "get_project_last_finalized_epoch_info",
            "Get the last finalized epoch of a project",
            object(
                json!({ "project_id": {"type": "string", "description": "Snapshotter project id"} }),
                &["project_id"],
            ),
        ),
        definition(
            "get_data_for_project_id_epoch_id",
            "Get the finalized snapshot data of a project at an epoch",
            project_epoch(),
        ),
        definition(
            "get_finalized_cid_for_project_id_epoch_id",
            "Get the IPFS CID of a project's finalized snapshot at an epoch",
            project_epoch(),
        ),
    ]
}
