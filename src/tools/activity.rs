use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::gateway::{ApiClient, Endpoint};
use crate::models::{DailyActivePools, DailyActiveTokens};
use crate::validation::{
    check_range, Arguments, DAY_SECS, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE,
    MIN_PAGE, MIN_PAGE_SIZE,
};

/// Paging and window shared by the daily-active tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRequest {
    pub page: u64,
    pub size: u64,
    pub metadata: bool,
    pub time_interval: u64,
}

impl Default for ActivityRequest {
    fn default() -> Self {
        ActivityRequest {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            metadata: false,
            time_interval: DAY_SECS,
        }
    }
}

impl ActivityRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;

        let page = check_range(
            "page",
            args.optional_u64("page")?.unwrap_or(DEFAULT_PAGE),
            MIN_PAGE,
            MAX_PAGE,
        )?;
        let size = check_range(
            "size",
            args.optional_u64("size")?.unwrap_or(DEFAULT_PAGE_SIZE),
            MIN_PAGE_SIZE,
            MAX_PAGE_SIZE,
        )?;

        Ok(ActivityRequest {
            page,
            size,
            metadata: args.optional_bool("metadata")?.unwrap_or(false),
            time_interval: args.time_interval("time_interval", Some(DAY_SECS))?,
        })
    }

    pub fn endpoint(&self, root: &str) -> Endpoint {
        Endpoint::new(root)
            .query("page", self.page)
            .query("size", self.size)
            .query("metadata", self.metadata)
            .query("time_interval", self.time_interval)
    }
}

pub struct ActivityTool {
    client: ApiClient,
}

impl ActivityTool {
    pub fn new(client: ApiClient) -> Self {
        ActivityTool { client }
    }

    pub async fn get_daily_active_tokens(
        &self,
        request: ActivityRequest,
    ) -> Result<DailyActiveTokens> {
        debug!("Fetching daily active tokens: {:?}", request);

        let tokens: DailyActiveTokens = self
            .client
            .fetch(&request.endpoint("dailyActiveTokens"))
            .await?;

        info!(
            "Page {}/{} of active tokens ({} total)",
            tokens.pagination.page, tokens.pagination.total_pages, tokens.pagination.total
        );
        Ok(tokens)
    }

    pub async fn get_daily_active_pools(
        &self,
        request: ActivityRequest,
    ) -> Result<DailyActivePools> {
        debug!("Fetching daily active pools: {:?}", request);

        let pools: DailyActivePools = self
            .client
            .fetch(&request.endpoint("dailyActivePools"))
            .await?;

        info!(
            "Page {}/{} of active pools ({} total)",
            pools.pagination.page, pools.pagination.total_pages, pools.pagination.total
        );
        Ok(pools)
    }
}
