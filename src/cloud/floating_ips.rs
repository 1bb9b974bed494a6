//! Floating IPs client plus the assign/unassign action surface.

use crate::api::paginate;
use crate::api::types::{Action, FloatingIp, FloatingIpCreateRequest, Links};
use crate::api::wait::{wait_for_action, wait_for_actions};
use crate::api::{ApiError, Sdk};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

pub type CreateOpt = Box<dyn FnOnce(&mut FloatingIpCreateRequest) + Send>;

pub fn use_request(req: FloatingIpCreateRequest) -> CreateOpt {
    Box::new(move |r| *r = req)
}

#[async_trait]
pub trait FloatingIps: Send + Sync {
    async fn create(&self, opts: Vec<CreateOpt>) -> Result<FloatingIp, ApiError>;
    async fn get(&self, ip: &str) -> Result<FloatingIp, ApiError>;
    async fn delete(&self, ip: &str) -> Result<(), ApiError>;
    fn list(&self, cancel: CancellationToken) -> (Receiver<FloatingIp>, Receiver<ApiError>);
    fn actions(&self) -> Arc<dyn FloatingIpActions>;
}

#[async_trait]
pub trait FloatingIpActions: Send + Sync {
    async fn assign(&self, ip: &str, droplet_id: i64) -> Result<(), ApiError>;
    async fn unassign(&self, ip: &str) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct FloatingIpRoot {
    floating_ip: FloatingIp,
    #[serde(default)]
    links: Option<Links>,
}

#[derive(Deserialize)]
struct FloatingIpsRoot {
    #[serde(default)]
    floating_ips: Vec<FloatingIp>,
    #[serde(default)]
    links: Option<Links>,
}

#[derive(Deserialize)]
struct ActionRoot {
    action: Action,
}

pub struct FloatingIpsClient {
    sdk: Sdk,
    cancel: CancellationToken,
    actions: Arc<FloatingIpActionsClient>,
}

impl FloatingIpsClient {
    pub fn new(sdk: Sdk, cancel: CancellationToken) -> Self {
        let actions = Arc::new(FloatingIpActionsClient {
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
impl FloatingIps for FloatingIpsClient {
    async fn create(&self, opts: Vec<CreateOpt>) -> Result<FloatingIp, ApiError> {
        let mut req = FloatingIpCreateRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        let root: FloatingIpRoot = self.sdk.post("floating_ips", &req).await?;
        wait_for_actions(&self.sdk, &self.cancel, root.links.as_ref()).await?;
        Ok(root.floating_ip)
    }

    async fn get(&self, ip: &str) -> Result<FloatingIp, ApiError> {
        let root: FloatingIpRoot = self.sdk.get(&format!("floating_ips/{ip}")).await?;
        Ok(root.floating_ip)
    }

    async fn delete(&self, ip: &str) -> Result<(), ApiError> {
        self.sdk.delete(&format!("floating_ips/{ip}")).await
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<FloatingIp>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let root: FloatingIpsRoot =
                    sdk.get(&format!("floating_ips?{}", opts.query())).await?;
                Ok((root.floating_ips, root.links))
            }
        })
    }

    fn actions(&self) -> Arc<dyn FloatingIpActions> {
        self.actions.clone()
    }
}

pub struct FloatingIpActionsClient {
    sdk: Sdk,
    cancel: CancellationToken,
}

impl FloatingIpActionsClient {
    async fn run(&self, ip: &str, body: serde_json::Value) -> Result<(), ApiError> {
        let root: ActionRoot = self
            .sdk
            .post(&format!("floating_ips/{ip}/actions"), &body)
            .await?;
        wait_for_action(&self.sdk, &self.cancel, root.action).await
    }
}

#[async_trait]
impl FloatingIpActions for FloatingIpActionsClient {
    async fn assign(&self, ip: &str, droplet_id: i64) -> Result<(), ApiError> {
        self.run(ip, json!({"type": "assign", "droplet_id": droplet_id}))
            .await
    }

    async fn unassign(&self, ip: &str) -> Result<(), ApiError> {
        self.run(ip, json!({"type": "unassign"})).await
    }
}
