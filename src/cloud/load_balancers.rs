//! Load balancers client, including membership and rule mutations.

use crate::api::paginate;
use crate::api::types::{ForwardingRule, Links, LoadBalancer, LoadBalancerRequest};
use crate::api::{ApiError, Sdk};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

pub type CreateOpt = Box<dyn FnOnce(&mut LoadBalancerRequest) + Send>;

pub fn use_request(req: LoadBalancerRequest) -> CreateOpt {
    Box::new(move |r| *r = req)
}

#[async_trait]
pub trait LoadBalancers: Send + Sync {
    async fn create(
        &self,
        name: &str,
        region: &str,
        forwarding_rules: Vec<ForwardingRule>,
        opts: Vec<CreateOpt>,
    ) -> Result<LoadBalancer, ApiError>;
    async fn get(&self, id: &str) -> Result<LoadBalancer, ApiError>;
    async fn update(&self, id: &str, opts: Vec<CreateOpt>) -> Result<LoadBalancer, ApiError>;
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
    fn list(&self, cancel: CancellationToken) -> (Receiver<LoadBalancer>, Receiver<ApiError>);

    async fn add_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError>;
    async fn remove_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError>;
    async fn add_forwarding_rules(
        &self,
        id: &str,
        rules: Vec<ForwardingRule>,
    ) -> Result<(), ApiError>;
    async fn remove_forwarding_rules(
        &self,
        id: &str,
        rules: Vec<ForwardingRule>,
    ) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct LoadBalancerRoot {
    load_balancer: LoadBalancer,
}

#[derive(Deserialize)]
struct LoadBalancersRoot {
    #[serde(default)]
    load_balancers: Vec<LoadBalancer>,
    #[serde(default)]
    links: Option<Links>,
}

pub struct LoadBalancersClient {
    sdk: Sdk,
}

impl LoadBalancersClient {
    pub fn new(sdk: Sdk) -> Self {
        Self { sdk }
    }
}

#[async_trait]
impl LoadBalancers for LoadBalancersClient {
    async fn create(
        &self,
        name: &str,
        region: &str,
        forwarding_rules: Vec<ForwardingRule>,
        opts: Vec<CreateOpt>,
    ) -> Result<LoadBalancer, ApiError> {
        let mut req = LoadBalancerRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        req.name = name.to_string();
        req.region = region.to_string();
        req.forwarding_rules = forwarding_rules;
        let root: LoadBalancerRoot = self.sdk.post("load_balancers", &req).await?;
        Ok(root.load_balancer)
    }

    async fn get(&self, id: &str) -> Result<LoadBalancer, ApiError> {
        let root: LoadBalancerRoot = self.sdk.get(&format!("load_balancers/{id}")).await?;
        Ok(root.load_balancer)
    }

    async fn update(&self, id: &str, opts: Vec<CreateOpt>) -> Result<LoadBalancer, ApiError> {
        let mut req = LoadBalancerRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        let root: LoadBalancerRoot = self
            .sdk
            .put(&format!("load_balancers/{id}"), &req)
            .await?;
        Ok(root.load_balancer)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.sdk.delete(&format!("load_balancers/{id}")).await
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<LoadBalancer>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let root: LoadBalancersRoot =
                    sdk.get(&format!("load_balancers?{}", opts.query())).await?;
                Ok((root.load_balancers, root.links))
            }
        })
    }

    async fn add_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError> {
        let body = json!({ "droplet_ids": droplet_ids });
        let _: serde_json::Value = self
            .sdk
            .post(&format!("load_balancers/{id}/droplets"), &body)
            .await?;
        Ok(())
    }

    async fn remove_droplets(&self, id: &str, droplet_ids: Vec<i64>) -> Result<(), ApiError> {
        let body = json!({ "droplet_ids": droplet_ids });
        self.sdk
            .delete_with_body(&format!("load_balancers/{id}/droplets"), &body)
            .await
    }

    async fn add_forwarding_rules(
        &self,
        id: &str,
        rules: Vec<ForwardingRule>,
    ) -> Result<(), ApiError> {
        let body = json!({ "forwarding_rules": rules });
        let _: serde_json::Value = self
            .sdk
            .post(&format!("load_balancers/{id}/forwarding_rules"), &body)
            .await?;
        Ok(())
    }

    async fn remove_forwarding_rules(
        &self,
        id: &str,
        rules: Vec<ForwardingRule>,
    ) -> Result<(), ApiError> {
        let body = json!({ "forwarding_rules": rules });
        self.sdk
            .delete_with_body(&format!("load_balancers/{id}/forwarding_rules"), &body)
            .await
    }
}
