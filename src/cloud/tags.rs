//! Tags client.

use crate::api::paginate;
use crate::api::types::{Links, Tag, TagCreateRequest, TagResource};
use crate::api::{ApiError, Sdk};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

pub type CreateOpt = Box<dyn FnOnce(&mut TagCreateRequest) + Send>;

pub fn use_request(req: TagCreateRequest) -> CreateOpt {
    Box::new(move |r| *r = req)
}

#[async_trait]
pub trait Tags: Send + Sync {
    async fn create(&self, name: &str, opts: Vec<CreateOpt>) -> Result<Tag, ApiError>;
    async fn get(&self, name: &str) -> Result<Tag, ApiError>;
    async fn delete(&self, name: &str) -> Result<(), ApiError>;
    fn list(&self, cancel: CancellationToken) -> (Receiver<Tag>, Receiver<ApiError>);
    async fn tag_resources(&self, name: &str, resources: Vec<TagResource>)
        -> Result<(), ApiError>;
    async fn untag_resources(
        &self,
        name: &str,
        resources: Vec<TagResource>,
    ) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct TagRoot {
    tag: Tag,
}

#[derive(Deserialize)]
struct TagsRoot {
    #[serde(default)]
    tags: Vec<Tag>,
    #[serde(default)]
    links: Option<Links>,
}

pub struct TagsClient {
    sdk: Sdk,
}

impl TagsClient {
    pub fn new(sdk: Sdk) -> Self {
        Self { sdk }
    }
}

#[async_trait]
impl Tags for TagsClient {
    async fn create(&self, name: &str, opts: Vec<CreateOpt>) -> Result<Tag, ApiError> {
        let mut req = TagCreateRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        req.name = name.to_string();
        let root: TagRoot = self.sdk.post("tags", &req).await?;
        Ok(root.tag)
    }

    async fn get(&self, name: &str) -> Result<Tag, ApiError> {
        let root: TagRoot = self.sdk.get(&format!("tags/{name}")).await?;
        Ok(root.tag)
    }

    async fn delete(&self, name: &str) -> Result<(), ApiError> {
        self.sdk.delete(&format!("tags/{name}")).await
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Tag>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let root: TagsRoot = sdk.get(&format!("tags?{}", opts.query())).await?;
                Ok((root.tags, root.links))
            }
        })
    }

    async fn tag_resources(
        &self,
        name: &str,
        resources: Vec<TagResource>,
    ) -> Result<(), ApiError> {
        let body = json!({ "resources": resources });
        let _: serde_json::Value = self
            .sdk
            .post(&format!("tags/{name}/resources"), &body)
            .await?;
        Ok(())
    }

    async fn untag_resources(
        &self,
        name: &str,
        resources: Vec<TagResource>,
    ) -> Result<(), ApiError> {
        let body = json!({ "resources": resources });
        self.sdk
            .delete_with_body(&format!("tags/{name}/resources"), &body)
            .await
    }
}
