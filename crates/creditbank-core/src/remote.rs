use crate::error::{QuoteError, QuoteResult};
use crate::types::{Bank, CreditBounds, Group};
use async_trait::async_trait;

pub const CREDIT_CONFIGURATION_NOT_FOUND_MESSAGE: &str = "[creditConfiguration not found]";

/// Read access to bank records held by the config backend.
///
/// Implementations fetch on every call; bounds are never cached across requests.
#[async_trait]
pub trait BoundsProvider: Send + Sync {
    async fn get_bank(&self, bank_id: &str) -> QuoteResult<Bank>;

    /// Credit bounds of `bank_id`. A bank without a credit configuration is a not-found condition.
    async fn get_credit_bounds(&self, bank_id: &str) -> QuoteResult<CreditBounds> {
        self.get_bank(bank_id)
            .await?
            .credit_configuration
            .ok_or_else(|| QuoteError::not_found(CREDIT_CONFIGURATION_NOT_FOUND_MESSAGE))
    }
}

/// Group collection owned by the external store. No compare-and-swap is offered.
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn list_groups(&self) -> QuoteResult<Vec<Group>>;

    async fn update_group(&self, id: &str, group: &Group) -> QuoteResult<Group>;
}
