//! Domains client: DNS zones plus records nested under the zone name.

use crate::api::paginate;
use crate::api::types::{Domain, DomainCreateRequest, DomainRecord, DomainRecordEditRequest, Links};
use crate::api::{ApiError, Sdk};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

pub type CreateOpt = Box<dyn FnOnce(&mut DomainCreateRequest) + Send>;

pub fn use_request(req: DomainCreateRequest) -> CreateOpt {
    Box::new(move |r| *r = req)
}

pub type RecordOpt = Box<dyn FnOnce(&mut DomainRecordEditRequest) + Send>;

pub fn use_record(req: DomainRecordEditRequest) -> RecordOpt {
    Box::new(move |r| *r = req)
}

#[async_trait]
pub trait Domains: Send + Sync {
    async fn create(&self, name: &str, ip: &str, opts: Vec<CreateOpt>)
        -> Result<Domain, ApiError>;
    async fn get(&self, name: &str) -> Result<Domain, ApiError>;
    async fn delete(&self, name: &str) -> Result<(), ApiError>;
    fn list(&self, cancel: CancellationToken) -> (Receiver<Domain>, Receiver<ApiError>);

    async fn create_record(
        &self,
        domain: &str,
        opts: Vec<RecordOpt>,
    ) -> Result<DomainRecord, ApiError>;
    async fn get_record(&self, domain: &str, id: i64) -> Result<DomainRecord, ApiError>;
    async fn update_record(
        &self,
        domain: &str,
        id: i64,
        opts: Vec<RecordOpt>,
    ) -> Result<DomainRecord, ApiError>;
    async fn delete_record(&self, domain: &str, id: i64) -> Result<(), ApiError>;
    fn list_records(
        &self,
        cancel: CancellationToken,
        domain: &str,
    ) -> (Receiver<DomainRecord>, Receiver<ApiError>);
}

#[derive(Deserialize)]
struct DomainRoot {
    domain: Domain,
}

#[derive(Deserialize)]
struct DomainsRoot {
    #[serde(default)]
    domains: Vec<Domain>,
    #[serde(default)]
    links: Option<Links>,
}

#[derive(Deserialize)]
struct RecordRoot {
    domain_record: DomainRecord,
}

#[derive(Deserialize)]
struct RecordsRoot {
    #[serde(default)]
    domain_records: Vec<DomainRecord>,
    #[serde(default)]
    links: Option<Links>,
}

pub struct DomainsClient {
    sdk: Sdk,
}

impl DomainsClient {
    pub fn new(sdk: Sdk) -> Self {
        Self { sdk }
    }
}

#[async_trait]
impl Domains for DomainsClient {
    async fn create(
        &self,
        name: &str,
        ip: &str,
        opts: Vec<CreateOpt>,
    ) -> Result<Domain, ApiError> {
        let mut req = DomainCreateRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        req.name = name.to_string();
        req.ip_address = ip.to_string();
        let root: DomainRoot = self.sdk.post("domains", &req).await?;
        Ok(root.domain)
    }

    async fn get(&self, name: &str) -> Result<Domain, ApiError> {
        let root: DomainRoot = self.sdk.get(&format!("domains/{name}")).await?;
        Ok(root.domain)
    }

    async fn delete(&self, name: &str) -> Result<(), ApiError> {
        self.sdk.delete(&format!("domains/{name}")).await
    }

    fn list(&self, cancel: CancellationToken) -> (Receiver<Domain>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            async move {
                let root: DomainsRoot = sdk.get(&format!("domains?{}", opts.query())).await?;
                Ok((root.domains, root.links))
            }
        })
    }

    async fn create_record(
        &self,
        domain: &str,
        opts: Vec<RecordOpt>,
    ) -> Result<DomainRecord, ApiError> {
        let mut req = DomainRecordEditRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        let root: RecordRoot = self
            .sdk
            .post(&format!("domains/{domain}/records"), &req)
            .await?;
        Ok(root.domain_record)
    }

    async fn get_record(&self, domain: &str, id: i64) -> Result<DomainRecord, ApiError> {
        let root: RecordRoot = self.sdk.get(&format!("domains/{domain}/records/{id}")).await?;
        Ok(root.domain_record)
    }

    async fn update_record(
        &self,
        domain: &str,
        id: i64,
        opts: Vec<RecordOpt>,
    ) -> Result<DomainRecord, ApiError> {
        let mut req = DomainRecordEditRequest::default();
        for opt in opts {
            opt(&mut req);
        }
        let root: RecordRoot = self
            .sdk
            .put(&format!("domains/{domain}/records/{id}"), &req)
            .await?;
        Ok(root.domain_record)
    }

    async fn delete_record(&self, domain: &str, id: i64) -> Result<(), ApiError> {
        self.sdk.delete(&format!("domains/{domain}/records/{id}")).await
    }

    fn list_records(
        &self,
        cancel: CancellationToken,
        domain: &str,
    ) -> (Receiver<DomainRecord>, Receiver<ApiError>) {
        let sdk = self.sdk.clone();
        let domain = domain.to_string();
        paginate::stream(cancel, move |opts| {
            let sdk = sdk.clone();
            let domain = domain.clone();
            async move {
                let root: RecordsRoot = sdk
                    .get(&format!("domains/{domain}/records?{}", opts.query()))
                    .await?;
                Ok((root.domain_records, root.links))
            }
        })
    }
}
