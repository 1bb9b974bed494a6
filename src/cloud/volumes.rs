//! Volumes client: block-storage lifecycle, volume snapshots, and the
//! attach/detach action surface.

use crate::api::paginate;
use crate::api::types::{Action, Links, Snapshot, SnapshotCreateRequest, Volume, VolumeCreateRequest};
use crate::api::wait::wait_for_action;
use crate::api::{ApiError, Sdk};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

pub type CreateOpt = Box<dyn FnOnce(&mut VolumeCreateRequest) + Send>;

pub fn use_request(req: VolumeCreateRequest) -> CreateOpt {
    Box::new(move |r| *r = req)
}

pub type SnapshotOpt = Box<dyn FnOnce(&mut SnapshotCreateRequest) + Send>;

pub fn set_snapshot_description(desc: String) -> SnapshotOpt {
    Box::new(move |r| r.description = desc)
}

#[async_trait]
pub trait Volumes: Send + Sync {
    async fn create_volume(
        &self,
        name: &str,
        region: &str,
        size_gigabytes: i64,
        opts: Vec<CreateOpt>,
    ) -> Result<Volume, ApiError>;
    async fn get_volume(&self, id: &str) -> Result<Volume, ApiError>;
    async fn delete_volume(&self, id: &str) -> Result<(), ApiError>;
    fn list_volumes(&self, cancel: CancellationToken) -> (Receiver<Volume>, Receiver<ApiError>);

    async fn create_snapshot(
        &self,
        volume_id: &str,
        name: &str,
        opts: Vec<SnapshotOpt>,
    ) -> Result<Snapshot, ApiError>;
    async fn get_snapshot(&self, id: &str) -> Result<Snapshot, ApiError>;
    async fn delete_snapshot(&self, id: &str) -> Result<(), ApiError>;
    fn list_snapshots(
        &self,
        cancel: CancellationToken,
        volume_id: &str,
    ) -> (Receiver<Snapshot>, Receiver<ApiError>);

    fn actions(&self) -> Arc<dyn VolumeActions>;
}

#[async_trait]
pub trait VolumeActions: Send + Sync {
    async fn attach(&self, volume_id: &str, droplet_id: i64) -> Result<(), ApiError>;
    async fn detach_by_droplet_id(&self, volume_id: &str, droplet_id: i64)
        -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct VolumeRoot {
    volume: Volume,
}

#[derive(Deserialize)]
struct VolumesRoot {
    #[serde(default)]
    volumes: Vec<Volume>,
    #[serde(default)]
    links: Option<Links>,
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

#[derive(Deserialize)]
struct ActionRoot {
    action: Action,
}

pub struct VolumesClient {
    sdk: Sdk,
    actions: Arc<VolumeActionsClient>,
}

impl VolumesClient {
    pub fn new(sdk: Sdk, cancel: CancellationToken) -> Self {
        let actions = Arc::new(VolumeActionsClient {
            sdk: sdk.clone(),
            cancel,
        });
        Self { sdk, actions }
    }
}

#[async_trait]
impl Volumes for VolumesClient {
    async fn create_volume(
        &self,
        name: &str,
        region: &str,
        size_gigabytes: i64,
        opts: Vec<CreateOpt>,
    ) -> Result<Volume, ApiError> {
        let mut req = VolumeCreateRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        req.name = name.to_string();
        req.region = region.to_string();
        req.size_gigabytes = size_gigabytes;
        let root: VolumeRoot = self.sdk.post("volumes", &req).await?;
        Ok(root.volume)
    }

    async fn get_volume(&self, id: &str) -> Result<Volume, ApiError> {
        let root: VolumeRoot = self.sdk.get(&format!("volumes/{id}")).await?;
        Ok(root.volume)
    }

    async fn delete_volume(&self, id: &str) -> Result<(), ApiError> {
        self.sdk.delete(&format!("volumes/{id}")).await
    }

    fn list_volumes(&self, cancel: CancellationToken) -> (Receiver<Volume>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let root: VolumesRoot = sdk.get(&format!("volumes?{}", opts.query())).await?;
                Ok((root.volumes, root.links))
            }
        })
    }

    async fn create_snapshot(
        &self,
        volume_id: &str,
        name: &str,
        opts: Vec<SnapshotOpt>,
    ) -> Result<Snapshot, ApiError> {
        let mut req = SnapshotCreateRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        req.volume_id = volume_id.to_string();
        req.name = name.to_string();
        let root: SnapshotRoot = self
            .sdk
            .post(&format!("volumes/{volume_id}/snapshots"), &req)
            .await?;
        Ok(root.snapshot)
    }

    async fn get_snapshot(&self, id: &str) -> Result<Snapshot, ApiError> {
        let root: SnapshotRoot = self.sdk.get(&format!("snapshots/{id}")).await?;
        Ok(root.snapshot)
    }

    async fn delete_snapshot(&self, id: &str) -> Result<(), ApiError> {
        self.sdk.delete(&format!("snapshots/{id}")).await
    }

    fn list_snapshots(
        &self,
        cancel: CancellationToken,
        volume_id: &str,
    ) -> (Receiver<Snapshot>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        let volume_id = volume_id.to_string();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            let volume_id = volume_id.clone();
            async move {
                let root: SnapshotsRoot = sdk
                    .get(&format!("volumes/{volume_id}/snapshots?{}", opts.query()))
                    .await?;
                Ok((root.snapshots, root.links))
            }
        })
    }

    fn actions(&self) -> Arc<dyn VolumeActions> {
        self.actions.clone()
    }
}

pub struct VolumeActionsClient {
    sdk: Sdk,
    cancel: CancellationToken,
}

impl VolumeActionsClient {
    async fn run(&self, volume_id: &str, body: serde_json::Value) -> Result<(), ApiError> {
        let root: ActionRoot = self
            .sdk
            .post(&format!("volumes/{volume_id}/actions"), &body)
            .await?;
        wait_for_action(&self.sdk, &self.cancel, root.action).await
    }
}

#[async_trait]
impl VolumeActions for VolumeActionsClient {
    async fn attach(&self, volume_id: &str, droplet_id: i64) -> Result<(), ApiError> {
        self.run(volume_id, json!({"type": "attach", "droplet_id": droplet_id}))
            .await
    }

    async fn detach_by_droplet_id(
        &self,
        volume_id: &str,
        droplet_id: i64,
    ) -> Result<(), ApiError> {
        self.run(volume_id, json!({"type": "detach", "droplet_id": droplet_id}))
            .await
    }
}
