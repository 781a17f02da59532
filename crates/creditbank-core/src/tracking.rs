use crate::error::{QuoteError, QuoteResult};
use crate::remote::GroupStore;
use crate::types::Group;
use std::sync::Arc;
use tracing::{info, warn};

pub const GROUP_NOT_FOUND_MESSAGE: &str = "group not found";
pub const BANK_NOT_FOUND_MESSAGE: &str = "bank not found in stats";

/// Records that a group used this bank.
///
/// Read-all then write-one against the external store. Two concurrent requests for the
/// same group can both read counter `n` and both write `n + 1`; the store offers no
/// compare-and-swap, so the last writer wins on the whole `stats` map.
pub struct UsageTracker {
    groups: Arc<dyn GroupStore>,
    bank_name: String,
}

impl UsageTracker {
    pub fn new(groups: Arc<dyn GroupStore>, bank_name: impl Into<String>) -> Self {
        Self {
            groups,
            bank_name: bank_name.into(),
        }
    }

    pub fn bank_name(&self) -> &str {
        &self.bank_name
    }

    pub async fn track_request(&self, username: &str, password: &str) -> QuoteResult<()> {
        let group = self
            .groups
            .list_groups()
            .await?
            .into_iter()
            .find(|group| group.matches(username, password))
            .ok_or_else(|| QuoteError::not_found(GROUP_NOT_FOUND_MESSAGE))?;

        let Some(count) = group.stats.get(&self.bank_name).copied() else {
            warn!(group = %group.id, bank = %self.bank_name, "Bank missing from group stats");
            return Err(QuoteError::invalid_state(BANK_NOT_FOUND_MESSAGE));
        };

        let mut stats = group.stats.clone();
        stats.insert(self.bank_name.clone(), count + 1);
        let updated = Group { stats, ..group };

        self.groups.update_group(&updated.id, &updated).await?;
        info!(
            group = %updated.id,
            bank = %self.bank_name,
            requests = count + 1,
            "Group usage tracked"
        );
        Ok(())
    }
}
