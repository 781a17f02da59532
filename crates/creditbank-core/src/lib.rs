//! Credit quote core for a simulated bank.
//!
//! Validates quote parameters against bounds owned by a remote config backend, prices the
//! quote, and records which client group used this bank. All remote I/O goes through the
//! [`BoundsProvider`] and [`GroupStore`] traits.

#![deny(unsafe_code)]

pub mod calculator;
pub mod error;
pub mod pipeline;
pub mod remote;
pub mod tracking;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use calculator::{lending_rate, CreditCalculator};
pub use error::{QuoteError, QuoteResult};
pub use pipeline::{LocalBank, QuoteService};
pub use remote::{BoundsProvider, GroupStore, CREDIT_CONFIGURATION_NOT_FOUND_MESSAGE};
pub use tracking::{UsageTracker, BANK_NOT_FOUND_MESSAGE, GROUP_NOT_FOUND_MESSAGE};
pub use types::{
    Bank, Credit, CreditBounds, Group, QuoteRequest, RatingLevel, ValidatedQuoteRequest,
};
pub use validation::{Constraint, Field, FieldRule, RuleSet, ValidationEngine};
