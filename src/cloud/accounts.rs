//! Account client. The account is a fetched singleton; nothing is creatable.

use crate::api::types::Account;
use crate::api::{ApiError, Sdk};
use async_trait::async_trait;
use serde::Deserialize;

#[async_trait]
pub trait Accounts: Send + Sync {
    async fn get(&self) -> Result<Account, ApiError>;
}

#[derive(Deserialize)]
struct AccountRoot {
    account: Account,
}

pub struct AccountsClient {
    sdk: Sdk,
}

impl AccountsClient {
    pub fn new(sdk: Sdk) -> Self {
        Self { sdk }
    }
}

#[async_trait]
impl Accounts for AccountsClient {
    async fn get(&self) -> Result<Account, ApiError> {
        let root: AccountRoot = self.sdk.get("account").await?;
        Ok(root.account)
    }
}
