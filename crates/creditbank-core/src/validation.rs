//! Per-request rule sets built from remotely fetched credit bounds.
//!
//! A [`RuleSet`] is plain data: one [`FieldRule`] per request field, in field declaration
//! order, each holding declarative [`Constraint`]s. [`RuleSet::check`] interprets it and
//! reports at most one reason per field, so the reason order always follows field order.

use crate::error::{QuoteError, QuoteResult};
use crate::remote::BoundsProvider;
use crate::types::{CreditBounds, QuoteRequest, RatingLevel, ValidatedQuoteRequest};
use std::sync::Arc;
use tracing::debug;

pub const USERNAME_MIN_LENGTH: usize = 6;
pub const USERNAME_MAX_LENGTH: usize = 50;
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    AmountInEuros,
    TermInMonths,
    RatingLevel,
    DelayInMilliseconds,
    Username,
    Password,
}

impl Field {
    pub const ORDER: [Field; 6] = [
        Self::AmountInEuros,
        Self::TermInMonths,
        Self::RatingLevel,
        Self::DelayInMilliseconds,
        Self::Username,
        Self::Password,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::AmountInEuros => "amountInEuros",
            Self::TermInMonths => "termInMonths",
            Self::RatingLevel => "ratingLevel",
            Self::DelayInMilliseconds => "delayInMilliseconds",
            Self::Username => "username",
            Self::Password => "password",
        }
    }

    fn value(self, request: &QuoteRequest) -> Option<&str> {
        let value = match self {
            Self::AmountInEuros => &request.amount_in_euros,
            Self::TermInMonths => &request.term_in_months,
            Self::RatingLevel => &request.rating_level,
            Self::DelayInMilliseconds => &request.delay_in_milliseconds,
            Self::Username => &request.username,
            Self::Password => &request.password,
        };
        value.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// One or more ASCII digits.
    WholeNumber,
    /// Optional leading `-`, then one or more ASCII digits, fitting in `i64`.
    SignedWholeNumber,
    AtLeast(u64),
    AtMost(u64),
    /// Case-insensitive rating name with ordinal in `[min, max]`.
    RatingBetween { min: RatingLevel, max: RatingLevel },
    MinLength(usize),
    MaxLength(usize),
}

impl Constraint {
    /// Range checks pass on non-numeric input; the number-type constraint reports those.
    fn is_satisfied_by(&self, value: &str) -> bool {
        match self {
            Self::WholeNumber => is_digits(value),
            Self::SignedWholeNumber => parse_signed(value).is_some(),
            Self::AtLeast(min) => value.parse::<u64>().map_or(true, |n| n >= *min),
            Self::AtMost(max) => match value.parse::<u64>() {
                Ok(n) => n <= *max,
                Err(_) => !is_digits(value),
            },
            Self::RatingBetween { min, max } => RatingLevel::parse(value)
                .map_or(false, |level| {
                    min.ordinal() <= level.ordinal() && level.ordinal() <= max.ordinal()
                }),
            Self::MinLength(length) => value.chars().count() >= *length,
            Self::MaxLength(length) => value.chars().count() <= *length,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::WholeNumber | Self::SignedWholeNumber => "must be a whole number".to_string(),
            Self::AtLeast(min) => format!("must be at least '{min}'"),
            Self::AtMost(max) => format!("must be at most '{max}'"),
            Self::RatingBetween { min, max } => {
                let upper = RatingLevel::range(*min, *max).map(|level| format!("'{level}'"));
                let lower = RatingLevel::range(*min, *max)
                    .map(|level| format!("'{}'", level.letter().to_ascii_lowercase()));
                format!(
                    "must be one of: {}",
                    upper.chain(lower).collect::<Vec<_>>().join(", ")
                )
            }
            Self::MinLength(length) => format!("must have at least {length} characters"),
            Self::MaxLength(length) => format!("must have at most {length} characters"),
        }
    }
}

/// Every field is required; constraints run in order and stop at the first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: Field,
    pub constraints: Vec<Constraint>,
}

impl FieldRule {
    fn new(field: Field, constraints: Vec<Constraint>) -> Self {
        Self { field, constraints }
    }

    fn violation(&self, request: &QuoteRequest) -> Option<String> {
        let name = self.field.name();
        let Some(value) = self.field.value(request) else {
            return Some(format!("{name} is required"));
        };

        self.constraints
            .iter()
            .find(|constraint| !constraint.is_satisfied_by(value))
            .map(|constraint| format!("{name} {}", constraint.message()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<FieldRule>,
}

impl RuleSet {
    pub fn for_bounds(bounds: &CreditBounds) -> Self {
        use Constraint::*;

        let rules = Field::ORDER
            .into_iter()
            .map(|field| {
                let constraints = match field {
                    Field::AmountInEuros => vec![
                        WholeNumber,
                        AtLeast(u64::from(bounds.min_amount_in_euros)),
                        AtMost(u64::from(bounds.max_amount_in_euros)),
                    ],
                    Field::TermInMonths => vec![
                        WholeNumber,
                        AtLeast(u64::from(bounds.min_term_in_months)),
                        AtMost(u64::from(bounds.max_term_in_months)),
                    ],
                    Field::RatingLevel => vec![RatingBetween {
                        min: bounds.min_rating,
                        max: bounds.max_rating,
                    }],
                    Field::DelayInMilliseconds => vec![SignedWholeNumber],
                    Field::Username => vec![
                        MinLength(USERNAME_MIN_LENGTH),
                        MaxLength(USERNAME_MAX_LENGTH),
                    ],
                    Field::Password => vec![
                        MinLength(PASSWORD_MIN_LENGTH),
                        MaxLength(PASSWORD_MAX_LENGTH),
                    ],
                };
                FieldRule::new(field, constraints)
            })
            .collect();

        Self { rules }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// All reasons, one per offending field, in field order.
    pub fn check(&self, request: &QuoteRequest) -> Vec<String> {
        self.rules
            .iter()
            .filter_map(|rule| rule.violation(request))
            .collect()
    }

    pub fn apply(&self, request: &QuoteRequest) -> QuoteResult<ValidatedQuoteRequest> {
        let reasons = self.check(request);
        if !reasons.is_empty() {
            return Err(QuoteError::ValidationFailed(reasons));
        }

        Ok(ValidatedQuoteRequest {
            amount_in_euros: typed(request, Field::AmountInEuros, |v| v.parse().ok())?,
            term_in_months: typed(request, Field::TermInMonths, |v| v.parse().ok())?,
            rating_level: typed(request, Field::RatingLevel, RatingLevel::parse)?,
            delay_in_milliseconds: typed(request, Field::DelayInMilliseconds, parse_signed)?,
            username: typed(request, Field::Username, |v| Some(v.to_string()))?,
            password: typed(request, Field::Password, |v| Some(v.to_string()))?,
        })
    }
}

fn typed<T>(
    request: &QuoteRequest,
    field: Field,
    parse: impl FnOnce(&str) -> Option<T>,
) -> QuoteResult<T> {
    field.value(request).and_then(parse).ok_or_else(|| {
        QuoteError::ValidationFailed(vec![format!("{} must be a whole number", field.name())])
    })
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn parse_signed(value: &str) -> Option<i64> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if !is_digits(digits) {
        return None;
    }
    value.parse().ok()
}

/// Validates raw quote requests against the local bank's current bounds.
pub struct ValidationEngine {
    bounds: Arc<dyn BoundsProvider>,
    bank_id: String,
}

impl ValidationEngine {
    pub fn new(bounds: Arc<dyn BoundsProvider>, bank_id: impl Into<String>) -> Self {
        Self {
            bounds,
            bank_id: bank_id.into(),
        }
    }

    pub async fn validate(&self, raw: &QuoteRequest) -> QuoteResult<ValidatedQuoteRequest> {
        let bounds = self.bounds.get_credit_bounds(&self.bank_id).await?;
        let result = RuleSet::for_bounds(&bounds).apply(raw);
        if let Err(QuoteError::ValidationFailed(reasons)) = &result {
            debug!(bank = %self.bank_id, violations = reasons.len(), "Quote request rejected");
        }
        result
    }
}
