//! Images client. Lookup is split by identifier kind (numeric id vs slug);
//! the script binder dispatches between them.

use crate::api::paginate;
use crate::api::types::{Image, ImageUpdateRequest, Links};
use crate::api::{ApiError, Sdk};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

pub type UpdateOpt = Box<dyn FnOnce(&mut ImageUpdateRequest) + Send>;

pub fn use_request(req: ImageUpdateRequest) -> UpdateOpt {
    Box::new(move |r| *r = req)
}

#[async_trait]
pub trait Images: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Image, ApiError>;
    async fn get_by_slug(&self, slug: &str) -> Result<Image, ApiError>;
    async fn update(&self, id: i64, opts: Vec<UpdateOpt>) -> Result<Image, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
    fn list(&self, cancel: CancellationToken) -> (Receiver<Image>, Receiver<ApiError>);
    fn list_distribution(&self, cancel: CancellationToken)
        -> (Receiver<Image>, Receiver<ApiError>);
    fn list_application(&self, cancel: CancellationToken)
        -> (Receiver<Image>, Receiver<ApiError>);
    fn list_user(&self, cancel: CancellationToken) -> (Receiver<Image>, Receiver<ApiError>);
}

#[derive(Deserialize)]
struct ImageRoot {
    image: Image,
}

#[derive(Deserialize)]
struct ImagesRoot {
    #[serde(default)]
    images: Vec<Image>,
    #[serde(default)]
    links: Option<Links>,
}

pub struct ImagesClient {
    sdk: Sdk,
}

impl ImagesClient {
    pub fn new(sdk: Sdk) -> Self {
        Self { sdk }
    }

    fn list_filtered(
        &self,
        cancel: CancellationToken,
        filter: &'static str,
    ) -> (Receiver<Image>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let path = if filter.is_empty() {
                    format!("images?{}", opts.query())
                } else {
                    format!("images?{}&{}", opts.query(), filter)
                };
                let root: ImagesRoot = sdk.get(&path).await?;
                Ok((root.images, root.links))
            }
        })
    }
}

#[async_trait]
impl Images for ImagesClient {
    async fn get_by_id(&self, id: i64) -> Result<Image, ApiError> {
        let root: ImageRoot = self.sdk.get(&format!("images/{id}")).await?;
        Ok(root.image)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Image, ApiError> {
        let root: ImageRoot = self.sdk.get(&format!("images/{slug}")).await?;
        Ok(root.image)
    }

    async fn update(&self, id: i64, opts: Vec<UpdateOpt>) -> Result<Image, ApiError> {
        let mut req = ImageUpdateRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        let root: ImageRoot = self.sdk.put(&format!("images/{id}"), &req).await?;
        Ok(root.image)
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.sdk.delete(&format!("images/{id}")).await
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Image>, Receiver<ApiError>) {
        self.list_filtered(cancel, "")
    }

    fn list_distribution(
        &self,
        cancel: CancellationToken,
    ) -> (Receiver<Image>, Receiver<ApiError>) {
        self.list_filtered(cancel, "type=distribution")
    }

    fn list_application(
        &self,
        cancel: CancellationToken,
    ) -> (Receiver<Image>, Receiver<ApiError>) {
        self.list_filtered(cancel, "type=application")
    }

    fn list_user(&self, cancel: CancellationToken) -> (Receiver<Image>, Receiver<ApiError>) {
        self.list_filtered(cancel, "private=true")
    }
}
