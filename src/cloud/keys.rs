//! SSH keys client. Every lookup/mutation exists in a by-id and a
//! by-fingerprint flavor; disambiguation happens one level above.

use crate::api::paginate;
use crate::api::types::{Key, KeyCreateRequest, KeyUpdateRequest, Links};
use crate::api::{ApiError, Sdk};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

pub type CreateOpt = Box<dyn FnOnce(&mut KeyCreateRequest) + Send>;

pub type UpdateOpt = Box<dyn FnOnce(&mut KeyUpdateRequest) + Send>;

pub fn use_update_request(req: KeyUpdateRequest) -> UpdateOpt {
    Box::new(move |r| *r = req)
}

#[async_trait]
pub trait Keys: Send + Sync {
    async fn create(
        &self,
        name: &str,
        public_key: &str,
        opts: Vec<CreateOpt>,
    ) -> Result<Key, ApiError>;
    async fn get_by_id(&self, id: i64) -> Result<Key, ApiError>;
    async fn get_by_fingerprint(&self, fingerprint: &str) -> Result<Key, ApiError>;
    async fn update_by_id(&self, id: i64, opts: Vec<UpdateOpt>) -> Result<Key, ApiError>;
    async fn update_by_fingerprint(
        &self,
        fingerprint: &str,
        opts: Vec<UpdateOpt>,
    ) -> Result<Key, ApiError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), ApiError>;
    async fn delete_by_fingerprint(&self, fingerprint: &str) -> Result<(), ApiError>;
    fn list(&self, cancel: CancellationToken) -> (Receiver<Key>, Receiver<ApiError>);
}

#[derive(Deserialize)]
struct KeyRoot {
    ssh_key: Key,
}

#[derive(Deserialize)]
struct KeysRoot {
    #[serde(default)]
    ssh_keys: Vec<Key>,
    #[serde(default)]
    links: Option<Links>,
}

pub struct KeysClient {
    sdk: Sdk,
}

impl KeysClient {
    pub fn new(sdk: Sdk) -> Self {
        Self { sdk }
    }

    async fn update(&self, selector: &str, opts: Vec<UpdateOpt>) -> Result<Key, ApiError> {
        let mut req = KeyUpdateRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        let root: KeyRoot = self
            .sdk
            .put(&format!("account/keys/{selector}"), &req)
            .await?;
        Ok(root.ssh_key)
    }
}

#[async_trait]
impl Keys for KeysClient {
    async fn create(
        &self,
        name: &str,
        public_key: &str,
        opts: Vec<CreateOpt>,
    ) -> Result<Key, ApiError> {
        let mut req = KeyCreateRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        req.name = name.to_string();
        req.public_key = public_key.to_string();
        let root: KeyRoot = self.sdk.post("account/keys", &req).await?;
        Ok(root.ssh_key)
    }

    async fn get_by_id(&self, id: i64) -> Result<Key, ApiError> {
        let root: KeyRoot = self.sdk.get(&format!("account/keys/{id}")).await?;
        Ok(root.ssh_key)
    }

    async fn get_by_fingerprint(&self, fingerprint: &str) -> Result<Key, ApiError> {
        let root: KeyRoot = self.sdk.get(&format!("account/keys/{fingerprint}")).await?;
        Ok(root.ssh_key)
    }

    async fn update_by_id(&self, id: i64, opts: Vec<UpdateOpt>) -> Result<Key, ApiError> {
        self.update(&id.to_string(), opts).await
    }

    async fn update_by_fingerprint(
        &self,
        fingerprint: &str,
        opts: Vec<UpdateOpt>,
    ) -> Result<Key, ApiError> {
        self.update(fingerprint, opts).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), ApiError> {
        self.sdk.delete(&format!("account/keys/{id}")).await
    }

    async fn delete_by_fingerprint(&self, fingerprint: &str) -> Result<(), ApiError> {
        self.sdk.delete(&format!("account/keys/{fingerprint}")).await
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Key>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let root: KeysRoot = sdk.get(&format!("account/keys?{}", opts.query())).await?;
                Ok((root.ssh_keys, root.links))
            }
        })
    }
}
