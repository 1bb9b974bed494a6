//! Droplets client: lifecycle plus the per-droplet action surface.

use crate::api::paginate;
use crate::api::types::{
    Action, Droplet, DropletCreateRequest, DropletMultiCreateRequest, Links,
};
use crate::api::wait::{wait_for_action, wait_for_actions};
use crate::api::{ApiError, Sdk};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

/// Optional argument to [`Droplets::create`]; applied in order over the
/// request record, last write wins.
pub type CreateOpt = Box<dyn FnOnce(&mut DropletCreateRequest) + Send>;

/// Replace the whole create request before the positional fields are applied.
pub fn use_request(req: DropletCreateRequest) -> CreateOpt {
    Box::new(move |r| *r = req)
}

pub type CreateMultipleOpt = Box<dyn FnOnce(&mut DropletMultiCreateRequest) + Send>;

pub fn use_multi_request(req: DropletMultiCreateRequest) -> CreateMultipleOpt {
    Box::new(move |r| *r = req)
}

/// A client for the droplets family.
#[async_trait]
pub trait Droplets: Send + Sync {
    async fn create(
        &self,
        name: &str,
        region: &str,
        size: &str,
        image_slug: &str,
        opts: Vec<CreateOpt>,
    ) -> Result<Droplet, ApiError>;
    async fn create_multiple(
        &self,
        names: &[String],
        region: &str,
        size: &str,
        image_slug: &str,
        opts: Vec<CreateMultipleOpt>,
    ) -> Result<Vec<Droplet>, ApiError>;
    async fn get(&self, id: i64) -> Result<Droplet, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
    fn list(&self, cancel: CancellationToken) -> (Receiver<Droplet>, Receiver<ApiError>);
    fn actions(&self) -> Arc<dyn DropletActions>;
}

/// Per-droplet actions. Every call returns only once the server-side action
/// has reached a terminal state.
#[async_trait]
pub trait DropletActions: Send + Sync {
    async fn shutdown(&self, droplet_id: i64) -> Result<(), ApiError>;
    async fn power_off(&self, droplet_id: i64) -> Result<(), ApiError>;
    async fn power_on(&self, droplet_id: i64) -> Result<(), ApiError>;
    async fn power_cycle(&self, droplet_id: i64) -> Result<(), ApiError>;
    async fn reboot(&self, droplet_id: i64) -> Result<(), ApiError>;
    async fn restore(&self, droplet_id: i64, image_id: i64) -> Result<(), ApiError>;
    async fn resize(
        &self,
        droplet_id: i64,
        size_slug: &str,
        resize_disk: bool,
    ) -> Result<(), ApiError>;
    async fn rename(&self, droplet_id: i64, name: &str) -> Result<(), ApiError>;
    async fn snapshot(&self, droplet_id: i64, name: &str) -> Result<(), ApiError>;
    async fn enable_backups(&self, droplet_id: i64) -> Result<(), ApiError>;
    async fn disable_backups(&self, droplet_id: i64) -> Result<(), ApiError>;
    async fn password_reset(&self, droplet_id: i64) -> Result<(), ApiError>;
    async fn rebuild_by_image_id(&self, droplet_id: i64, image_id: i64) -> Result<(), ApiError>;
    async fn rebuild_by_image_slug(
        &self,
        droplet_id: i64,
        image_slug: &str,
    ) -> Result<(), ApiError>;
    async fn change_kernel(&self, droplet_id: i64, kernel_id: i64) -> Result<(), ApiError>;
    async fn enable_ipv6(&self, droplet_id: i64) -> Result<(), ApiError>;
    async fn enable_private_networking(&self, droplet_id: i64) -> Result<(), ApiError>;
    async fn upgrade(&self, droplet_id: i64) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct DropletRoot {
    droplet: Droplet,
    #[serde(default)]
    links: Option<Links>,
}

#[derive(Deserialize)]
struct DropletsRoot {
    #[serde(default)]
    droplets: Vec<Droplet>,
    #[serde(default)]
    links: Option<Links>,
}

#[derive(Deserialize)]
struct ActionRoot {
    action: Action,
}

pub struct DropletsClient {
    sdk: Sdk,
    cancel: CancellationToken,
    actions: Arc<DropletActionsClient>,
}

impl DropletsClient {
    pub fn new(sdk: Sdk, cancel: CancellationToken) -> Self {
        let actions = Arc::new(DropletActionsClient {
            sdk: sdk.clone(),
            cancel: cancel.clone(),
        });
        Self {
            sdk,
            cancel,
            actions,
        }
    }
}

#[async_trait]
impl Droplets for DropletsClient {
    async fn create(
        &self,
        name: &str,
        region: &str,
        size: &str,
        image_slug: &str,
        opts: Vec<CreateOpt>,
    ) -> Result<Droplet, ApiError> {
        let mut req = DropletCreateRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        req.name = name.to_string();
        req.region = region.to_string();
        req.size = size.to_string();
        if req.image.id == 0 {
            req.image.slug = image_slug.to_string();
        }

        let root: DropletRoot = self.sdk.post("droplets", &req).await?;
        wait_for_actions(&self.sdk, &self.cancel, root.links.as_ref()).await?;
        Ok(root.droplet)
    }

    async fn create_multiple(
        &self,
        names: &[String],
        region: &str,
        size: &str,
        image_slug: &str,
        opts: Vec<CreateMultipleOpt>,
    ) -> Result<Vec<Droplet>, ApiError> {
        let mut req = DropletMultiCreateRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        req.names = names.to_vec();
        req.region = region.to_string();
        req.size = size.to_string();
        if req.image.id == 0 {
            req.image.slug = image_slug.to_string();
        }

        let root: DropletsRoot = self.sdk.post("droplets", &req).await?;
        Ok(root.droplets)
    }

    async fn get(&self, id: i64) -> Result<Droplet, ApiError> {
        let root: DropletRoot = self.sdk.get(&format!("droplets/{id}")).await?;
        Ok(root.droplet)
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.sdk.delete(&format!("droplets/{id}")).await
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Droplet>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let root: DropletsRoot = sdk.get(&format!("droplets?{}", opts.query())).await?;
                Ok((root.droplets, root.links))
            }
        })
    }

    fn actions(&self) -> Arc<dyn DropletActions> {
        self.actions.clone()
    }
}

pub struct DropletActionsClient {
    sdk: Sdk,
    cancel: CancellationToken,
}

impl DropletActionsClient {
    async fn run(&self, droplet_id: i64, body: serde_json::Value) -> Result<(), ApiError> {
        let root: ActionRoot = self
            .sdk
            .post(&format!("droplets/{droplet_id}/actions"), &body)
            .await?;
        wait_for_action(&self.sdk, &self.cancel, root.action).await
    }
}

#[async_trait]
impl DropletActions for DropletActionsClient {
    async fn shutdown(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "shutdown"})).await
    }

    async fn power_off(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "power_off"})).await
    }

    async fn power_on(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "power_on"})).await
    }

    async fn power_cycle(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "power_cycle"})).await
    }

    async fn reboot(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "reboot"})).await
    }

    async fn restore(&self, droplet_id: i64, image_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "restore", "image": image_id}))
            .await
    }

    async fn resize(
        &self,
        droplet_id: i64,
        size_slug: &str,
        resize_disk: bool,
    ) -> Result<(), ApiError> {
        self.run(
            droplet_id,
            json!({"type": "resize", "size": size_slug, "disk": resize_disk}),
        )
        .await
    }

    async fn rename(&self, droplet_id: i64, name: &str) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "rename", "name": name}))
            .await
    }

    async fn snapshot(&self, droplet_id: i64, name: &str) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "snapshot", "name": name}))
            .await
    }

    async fn enable_backups(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "enable_backups"})).await
    }

    async fn disable_backups(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "disable_backups"}))
            .await
    }

    async fn password_reset(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "password_reset"})).await
    }

    async fn rebuild_by_image_id(&self, droplet_id: i64, image_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "rebuild", "image": image_id}))
            .await
    }

    async fn rebuild_by_image_slug(
        &self,
        droplet_id: i64,
        image_slug: &str,
    ) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "rebuild", "image": image_slug}))
            .await
    }

    async fn change_kernel(&self, droplet_id: i64, kernel_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "change_kernel", "kernel": kernel_id}))
            .await
    }

    async fn enable_ipv6(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "enable_ipv6"})).await
    }

    async fn enable_private_networking(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "enable_private_networking"}))
            .await
    }

    async fn upgrade(&self, droplet_id: i64) -> Result<(), ApiError> {
        self.run(droplet_id, json!({"type": "upgrade"})).await
    }
}
