use crate::client::{ConfigBackendConfig, ResilientClient};
use async_trait::async_trait;
use creditbank_core::{Bank, BoundsProvider, Group, GroupStore, QuoteResult};

/// Bank and group documents served by the configuration backend.
///
/// - `GET banks/<id>`
/// - `GET groups`
/// - `PUT groups/<id>` with the full group document
#[derive(Debug, Clone)]
pub struct ConfigBackendClient {
    http: ResilientClient,
}

impl ConfigBackendClient {
    pub fn new(config: ConfigBackendConfig) -> QuoteResult<Self> {
        Ok(Self {
            http: ResilientClient::new(config)?,
        })
    }

    pub fn http(&self) -> &ResilientClient {
        &self.http
    }
}

#[async_trait]
impl BoundsProvider for ConfigBackendClient {
    async fn get_bank(&self, bank_id: &str) -> QuoteResult<Bank> {
        self.http.get(&format!("banks/{bank_id}")).await
    }
}

#[async_trait]
impl GroupStore for ConfigBackendClient {
    async fn list_groups(&self) -> QuoteResult<Vec<Group>> {
        self.http.get("groups").await
    }

    async fn update_group(&self, id: &str, group: &Group) -> QuoteResult<Group> {
        self.http.put(&format!("groups/{id}"), group).await
    }
}
