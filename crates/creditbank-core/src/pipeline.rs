use crate::calculator::CreditCalculator;
use crate::error::QuoteResult;
use crate::remote::{BoundsProvider, GroupStore};
use crate::tracking::UsageTracker;
use crate::types::{Credit, QuoteRequest};
use crate::validation::ValidationEngine;
use std::sync::Arc;

/// Identity of the bank this service quotes for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBank {
    /// Id used to fetch the bank record.
    pub id: String,
    /// Key of this bank in every group's `stats` map.
    pub name: String,
}

/// validate -> calculate -> track, strictly in sequence; the first failure ends the request.
///
/// A tracking failure after a successful calculation still fails the request, so no quote
/// is returned without its usage being recorded.
pub struct QuoteService {
    validation: ValidationEngine,
    calculator: CreditCalculator,
    tracker: UsageTracker,
}

impl QuoteService {
    pub fn new(
        bank: &LocalBank,
        bounds: Arc<dyn BoundsProvider>,
        groups: Arc<dyn GroupStore>,
    ) -> Self {
        Self {
            validation: ValidationEngine::new(bounds.clone(), bank.id.clone()),
            calculator: CreditCalculator::new(bounds, bank.id.clone()),
            tracker: UsageTracker::new(groups, bank.name.clone()),
        }
    }

    pub fn bank_name(&self) -> &str {
        self.tracker.bank_name()
    }

    pub async fn quote(&self, raw: &QuoteRequest) -> QuoteResult<Credit> {
        let request = self.validation.validate(raw).await?;

        let credit = self
            .calculator
            .calculate(
                request.amount_in_euros,
                request.term_in_months,
                request.rating_level,
                Some(request.delay_in_milliseconds),
            )
            .await?;

        self.tracker
            .track_request(&request.username, &request.password)
            .await?;

        Ok(credit)
    }
}
