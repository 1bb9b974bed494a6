//! Actions client: read-only access to the provider's operation log.

use crate::api::paginate;
use crate::api::types::{Action, Links};
use crate::api::{ApiError, Sdk};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait Actions: Send + Sync {
    async fn get(&self, id: i64) -> Result<Action, ApiError>;
    fn list(&self, cancel: CancellationToken) -> (Receiver<Action>, Receiver<ApiError>);
}

#[derive(Deserialize)]
struct ActionRoot {
    action: Action,
}

#[derive(Deserialize)]
struct ActionsRoot {
    #[serde(default)]
    actions: Vec<Action>,
    #[serde(default)]
    links: Option<Links>,
}

pub struct ActionsClient {
    sdk: Sdk,
}

impl ActionsClient {
    pub fn new(sdk: Sdk) -> Self {
        Self { sdk }
    }
}

#[async_trait]
impl Actions for ActionsClient {
    async fn get(&self, id: i64) -> Result<Action, ApiError> {
        let root: ActionRoot = self.sdk.get(&format!("actions/{id}")).await?;
        Ok(root.action)
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Action>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let root: ActionsRoot = sdk.get(&format!("actions?{}", opts.query())).await?;
                Ok((root.actions, root.links))
            }
        })
    }
}
