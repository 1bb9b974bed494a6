//! Firewalls client, including droplet/tag membership and rule mutations.

use crate::api::paginate;
use crate::api::types::{Firewall, FirewallRequest, InboundRule, Links, OutboundRule};
use crate::api::{ApiError, Sdk};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

pub type CreateOpt = Box<dyn FnOnce(&mut FirewallRequest) + Send>;

pub fn use_request(req: FirewallRequest) -> CreateOpt {
    Box::new(move |r| *r = req)
}

#[async_trait]
pub trait Firewalls: Send + Sync {
    async fn create(
        &self,
        name: &str,
        inbound_rules: Vec<InboundRule>,
        outbound_rules: Vec<OutboundRule>,
        opts: Vec<CreateOpt>,
    ) -> Result<Firewall, ApiError>;
    async fn get(&self, id: &str) -> Result<Firewall, ApiError>;
    async fn update(&self, id: &str, opts: Vec<CreateOpt>) -> Result<Firewall, ApiError>;
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
    fn list(&self, cancel: CancellationToken) -> (Receiver<Firewall>, Receiver<ApiError>);

    async fn add_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError>;
    async fn remove_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError>;
    async fn add_tags(&self, id: &str, tags: Vec<String>) -> Result<(), ApiError>;
    async fn remove_tags(&self, id: &str, tags: Vec<String>) -> Result<(), ApiError>;
    async fn add_rules(
        &self,
        id: &str,
        inbound_rules: Vec<InboundRule>,
        outbound_rules: Vec<OutboundRule>,
    ) -> Result<(), ApiError>;
    async fn remove_rules(
        &self,
        id: &str,
        inbound_rules: Vec<InboundRule>,
        outbound_rules: Vec<OutboundRule>,
    ) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct FirewallRoot {
    firewall: Firewall,
}

#[derive(Deserialize)]
struct FirewallsRoot {
    #[serde(default)]
    firewalls: Vec<Firewall>,
    #[serde(default)]
    links: Option<Links>,
}

pub struct FirewallsClient {
    sdk: Sdk,
}

impl FirewallsClient {
    pub fn new(sdk: Sdk) -> Self {
        Self { sdk }
    }
}

#[async_trait]
impl Firewalls for FirewallsClient {
    async fn create(
        &self,
        name: &str,
        inbound_rules: Vec<InboundRule>,
        outbound_rules: Vec<OutboundRule>,
        opts: Vec<CreateOpt>,
    ) -> Result<Firewall, ApiError> {
        let mut req = FirewallRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        req.name = name.to_string();
        req.inbound_rules = inbound_rules;
        req.outbound_rules = outbound_rules;
        let root: FirewallRoot = self.sdk.post("firewalls", &req).await?;
        Ok(root.firewall)
    }

    async fn get(&self, id: &str) -> Result<Firewall, ApiError> {
        let root: FirewallRoot = self.sdk.get(&format!("firewalls/{id}")).await?;
        Ok(root.firewall)
    }

    async fn update(&self, id: &str, opts: Vec<CreateOpt>) -> Result<Firewall, ApiError> {
        let mut req = FirewallRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        let root: FirewallRoot = self.sdk.put(&format!("firewalls/{id}"), &req).await?;
        Ok(root.firewall)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.sdk.delete(&format!("firewalls/{id}")).await
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Firewall>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let root: FirewallsRoot = sdk.get(&format!("firewalls?{}", opts.query())).await?;
                Ok((root.firewalls, root.links))
            }
        })
    }

    async fn add_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError> {
        let body = json!({ "droplet_ids": droplet_ids });
        let _: serde_json::Value = self
            .sdk
            .post(&format!("firewalls/{id}/droplets"), &body)
            .await?;
        Ok(())
    }

    async fn remove_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError> {
        let body = json!({ "droplet_ids": droplet_ids });
        self.sdk
            .delete_with_body(&format!("firewalls/{id}/droplets"), &body)
            .await
    }

    async fn add_tags(&self, id: &str, tags: Vec<String>) -> Result<(), ApiError> {
        let body = json!({ "tags": tags });
        let _: serde_json::Value = self
            .sdk
            .post(&format!("firewalls/{id}/tags"), &body)
            .await?;
        Ok(())
    }

    async fn remove_tags(&self, id: &str, tags: Vec<String>) -> Result<(), ApiError> {
        let body = json!({ "tags": tags });
        self.sdk
            .delete_with_body(&format!("firewalls/{id}/tags"), &body)
            .await
    }

    async fn add_rules(
        &self,
        id: &str,
        inbound_rules: Vec<InboundRule>,
        outbound_rules: Vec<OutboundRule>,
    ) -> Result<(), ApiError> {
        let body = json!({
            "inbound_rules": inbound_rules,
            "outbound_rules": outbound_rules,
        });
        let _: serde_json::Value = self
            .sdk
            .post(&format!("firewalls/{id}/rules"), &body)
            .await?;
        Ok(())
    }

    async fn remove_rules(
        &self,
        id: &str,
        inbound_rules: Vec<InboundRule>,
        outbound_rules: Vec<OutboundRule>,
    ) -> Result<(), ApiError> {
        let body = json!({
            "inbound_rules": inbound_rules,
            "outbound_rules": outbound_rules,
        });
        self.sdk
            .delete_with_body(&format!("firewalls/{id}/rules"), &body)
            .await
    }
}
