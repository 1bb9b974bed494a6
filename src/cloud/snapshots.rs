//! Snapshots client: unified listing over droplet and volume snapshots.

use crate::api::paginate;
use crate::api::types::{Links, Snapshot};
use crate::api::{ApiError, Sdk};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait Snapshots: Send + Sync {
    async fn get(&self, id: &str) -> Result<Snapshot, ApiError>;
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
    fn list(&self, cancel: CancellationToken) -> (Receiver<Snapshot>, Receiver<ApiError>);
    fn list_droplet(&self, cancel: CancellationToken) -> (Receiver<Snapshot>, Receiver<ApiError>);
    fn list_volume(&self, cancel: CancellationToken) -> (Receiver<Snapshot>, Receiver<ApiError>);
}

#[derive(Deserialize)]
struct SnapshotRoot {
    snapshot: Snapshot,
}

#[derive(Deserialize)]
struct SnapshotsRoot {
    #[serde(default)]
    snapshots: Vec<Snapshot>,
    #[serde(default)]
    links: Option<Links>,
}

pub struct SnapshotsClient {
    sdk: Sdk,
}

impl SnapshotsClient {
    pub fn new(sdk: Sdk) -> Self {
        Self { sdk }
    }

    fn list_filtered(
        &self,
        cancel: CancellationToken,
        filter: &'static str,
    ) -> (Receiver<Snapshot>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let path = if filter.is_empty() {
                    format!("snapshots?{}", opts.query())
                } else {
                    format!("snapshots?{}&resource_type={}", opts.query(), filter)
                };
                let root: SnapshotsRoot = sdk.get(&path).await?;
                Ok((root.snapshots, root.links))
            }
        })
    }
}

#[async_trait]
impl Snapshots for SnapshotsClient {
    async fn get(&self, id: &str) -> Result<Snapshot, ApiError> {
        let root: SnapshotRoot = self.sdk.get(&format!("snapshots/{id}")).await?;
        Ok(root.snapshot)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.sdk.delete(&format!("snapshots/{id}")).await
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Snapshot>, Receiver<ApiError>) {
        self.list_filtered(cancel, "")
    }

    fn list_droplet(&self, cancel: CancellationToken) -> (Receiver<Snapshot>, Receiver<ApiError>) {
        self.list_filtered(cancel, "droplet")
    }

    fn list_volume(&self, cancel: CancellationToken) -> (Receiver<Snapshot>, Receiver<ApiError>) {
        self.list_filtered(cancel, "volume")
    }
}
