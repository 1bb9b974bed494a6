//! Sizes client.

use crate::api::paginate;
use crate::api::types::{Links, Size};
use crate::api::{ApiError, Sdk};
use serde::Deserialize;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

pub trait Sizes: Send + Sync {
    fn list(&self, cancel: CancellationToken) -> (Receiver<Size>, Receiver<ApiError>);
}

#[derive(Deserialize)]
struct SizesRoot {
    #[serde(default)]
    sizes: Vec<Size>,
    #[serde(default)]
    links: Option<Links>,
}

pub struct SizesClient {
    sdk: Sdk,
}

impl SizesClient {
    pub fn new(sdk: Sdk) -> Self {
        Self { sdk }
    }
}

impl Sizes for SizesClient {
    fn list(&self, cancel: CancellationToken) -> (Receiver<Size>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let root: SizesRoot = sdk.get(&format!("sizes?{}", opts.query())).await?;
                Ok((root.sizes, root.links))
            }
        })
    }
}
