//! Regions client.

use crate::api::paginate;
use crate::api::types::{Links, Region};
use crate::api::{ApiError, Sdk};
use serde::Deserialize;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

pub trait Regions: Send + Sync {
    fn list(&self, cancel: CancellationToken) -> (Receiver<Region>, Receiver<ApiError>);
}

#[derive(Deserialize)]
struct RegionsRoot {
    #[serde(default)]
    regions: Vec<Region>,
    #[serde(default)]
    links: Option<Links>,
}

pub struct RegionsClient {
    sdk: Sdk,
}

impl RegionsClient {
    pub fn new(sdk: Sdk) -> Self {
        Self { sdk }
    }
}

impl Regions for RegionsClient {
    fn list(&self, cancel: CancellationToken) -> (Receiver<Region>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let root: RegionsRoot = sdk.get(&format!("regions?{}", opts.query())).await?;
                Ok((root.regions, root.links))
            }
        })
    }
}
