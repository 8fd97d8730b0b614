use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::gateway::{ApiClient, Endpoint};
use crate::models::{
    CurrentEpoch, EpochInfo, FinalizedCid, HealthStatus, LastFinalizedEpoch, ProjectEpochData,
};
use crate::validation::Arguments;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochInfoRequest {
    pub epoch_id: u64,
}

impl EpochInfoRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        Ok(EpochInfoRequest {
            epoch_id: args.required_u64("epoch_id")?,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("epoch").segment(self.epoch_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub project_id: String,
}

impl ProjectRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        Ok(ProjectRequest {
            project_id: args.required_str("project_id")?,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("last_finalized_epoch").segment(&self.project_id)
    }
}

/// Addresses a snapshot by `(project_id, epoch_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEpochRequest {
    pub project_id: String,
    pub epoch_id: u64,
}

impl ProjectEpochRequest {
    pub fn from_args(raw: &Value) -> Result<Self> {
        let args = Arguments::new(raw)?;
        Ok(ProjectEpochRequest {
            project_id: args.required_str("project_id")?,
            epoch_id: args.required_u64("epoch_id")?,
        })
    }

    // Upstream routes put the epoch first and require the trailing slash.
    pub fn endpoint(&self, root: &str) -> Endpoint {
        Endpoint::new(root)
            .segment(self.epoch_id)
            .segment(&self.project_id)
            .with_trailing_slash()
    }
}

/// Snapshotter core endpoints: health, epochs and finalized project data.
pub struct EpochTool {
    client: ApiClient,
}

impl EpochTool {
    pub fn new(client: ApiClient) -> Self {
        EpochTool { client }
    }

    pub async fn health_check(&self) -> Result<HealthStatus> {
        let health: HealthStatus = self.client.fetch(&Endpoint::new("health")).await?;
        info!("Snapshotter API health: {}", health.status);
        Ok(health)
    }

    pub async fn get_current_epoch_data(&self) -> Result<CurrentEpoch> {
        debug!("Fetching current epoch");
        self.client.fetch(&Endpoint::new("current_epoch")).await
    }

    pub async fn get_epoch_info(&self, request: EpochInfoRequest) -> Result<EpochInfo> {
        debug!("Fetching epoch info: {}", request.epoch_id);
        self.client.fetch(&request.endpoint()).await
    }

    pub async fn get_project_last_finalized_epoch_info(
        &self,
        request: ProjectRequest,
    ) -> Result<LastFinalizedEpoch> {
        debug!("Fetching last finalized epoch: project={}", request.project_id);
        self.client.fetch(&request.endpoint()).await
    }

    /// Finalized snapshot for a project at an epoch. Unfinalized epochs fail upstream.
    pub async fn get_data_for_project_id_epoch_id(
        &self,
        request: ProjectEpochRequest,
    ) -> Result<ProjectEpochData> {
        debug!(
            "Fetching project data: project={}, epoch={}",
            request.project_id, request.epoch_id
        );
        self.client.fetch(&request.endpoint("data")).await
    }

    pub async fn get_finalized_cid_for_project_id_epoch_id(
        &self,
        request: ProjectEpochRequest,
    ) -> Result<FinalizedCid> {
        debug!(
            "Fetching finalized CID: project={}, epoch={}",
            request.project_id, request.epoch_id
        );

        let cid: FinalizedCid = self.client.fetch(&request.endpoint("cid")).await?;

        info!(
            "Epoch {} of {} finalized as {}",
            request.epoch_id, request.project_id, cid.0
        );
        Ok(cid)
    }
}
