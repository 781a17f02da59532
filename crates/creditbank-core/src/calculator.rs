use crate::error::QuoteResult;
use crate::remote::BoundsProvider;
use crate::types::{Credit, RatingLevel};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DIVISOR_TERM_IN_MONTHS: u32 = 12;
const DIVISOR_AMOUNT_IN_EUROS: u32 = 1_000;
const DIVISOR_RATING_LEVEL: i64 = 10;
const MULTIPLIER_RANDOM_TERM: f64 = 3.0;
const DIVISOR_LENDING_RATE: f64 = 10.0;

/// Deterministic part of the lending rate plus a caller-supplied unit random in `[0, 1)`.
///
/// The result is always in `[0.0, 10.0)`.
pub fn lending_rate(
    amount_in_euros: u32,
    term_in_months: u32,
    rating_level: RatingLevel,
    min_rating: RatingLevel,
    unit_random: f64,
) -> f64 {
    let rating_offset = (rating_level.letter() as i64 - min_rating.letter() as i64)
        .rem_euclid(DIVISOR_RATING_LEVEL);

    let mut rate = f64::from(term_in_months % DIVISOR_TERM_IN_MONTHS);
    rate += f64::from(amount_in_euros % DIVISOR_AMOUNT_IN_EUROS);
    rate += rating_offset as f64;
    rate += unit_random.clamp(0.0, 1.0) * MULTIPLIER_RANDOM_TERM;

    let rate = rate.rem_euclid(DIVISOR_LENDING_RATE);
    // rem_euclid can round up to the divisor itself for inputs just below a multiple.
    if rate >= DIVISOR_LENDING_RATE {
        0.0
    } else {
        rate
    }
}

/// Turns validated quote inputs into a lending rate.
pub struct CreditCalculator {
    bounds: Arc<dyn BoundsProvider>,
    bank_id: String,
}

impl CreditCalculator {
    pub fn new(bounds: Arc<dyn BoundsProvider>, bank_id: impl Into<String>) -> Self {
        Self {
            bounds,
            bank_id: bank_id.into(),
        }
    }

    /// Waits `max(delay, 0)` milliseconds, then prices the quote against the bank's minimum rating.
    pub async fn calculate(
        &self,
        amount_in_euros: u32,
        term_in_months: u32,
        rating_level: RatingLevel,
        delay_in_milliseconds: Option<i64>,
    ) -> QuoteResult<Credit> {
        let delay = delay_in_milliseconds.unwrap_or(0).max(0) as u64;
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let bounds = self.bounds.get_credit_bounds(&self.bank_id).await?;
        let unit_random = rand::thread_rng().gen::<f64>();
        let lending_rate_in_percent = lending_rate(
            amount_in_euros,
            term_in_months,
            rating_level,
            bounds.min_rating,
            unit_random,
        );

        debug!(
            bank = %self.bank_id,
            delay_ms = delay,
            rate = lending_rate_in_percent,
            "Lending rate calculated"
        );

        Ok(Credit {
            lending_rate_in_percent,
        })
    }
}
