use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Credit-worthiness class. Declaration order is the rating order, `A` best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RatingLevel {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
}

impl RatingLevel {
    pub const ALL: [RatingLevel; 16] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
        Self::I,
        Self::J,
        Self::K,
        Self::L,
        Self::M,
        Self::N,
        Self::O,
        Self::P,
    ];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }

    /// Case-insensitive lookup by name.
    pub fn parse(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() {
            return None;
        }
        Self::ALL.into_iter().find(|level| level.letter() == letter)
    }

    /// Levels whose ordinal lies in `[min, max]`, in rating order.
    pub fn range(min: Self, max: Self) -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .filter(move |level| min.ordinal() <= level.ordinal() && level.ordinal() <= max.ordinal())
    }
}

impl fmt::Display for RatingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Authoritative quote bounds of one bank, fetched fresh per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBounds {
    pub min_amount_in_euros: u32,
    pub max_amount_in_euros: u32,
    pub min_term_in_months: u32,
    pub max_term_in_months: u32,
    #[serde(rename = "minSchufaRating")]
    pub min_rating: RatingLevel,
    #[serde(rename = "maxSchufaRating")]
    pub max_rating: RatingLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub is_async: bool,
    pub is_active: bool,
    #[serde(default)]
    pub credit_configuration: Option<CreditBounds>,
}

/// Client team entity owned by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub username: String,
    pub password: String,
    pub jms_queue: String,
    #[serde(default)]
    pub students: Vec<String>,
    #[serde(default)]
    pub stats: BTreeMap<String, u64>,
    #[serde(default)]
    pub has_passed: bool,
}

impl Group {
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Quote parameters as received from the transport layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub amount_in_euros: Option<String>,
    pub term_in_months: Option<String>,
    pub rating_level: Option<String>,
    pub delay_in_milliseconds: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Quote parameters after every field rule passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuoteRequest {
    pub amount_in_euros: u32,
    pub term_in_months: u32,
    pub rating_level: RatingLevel,
    pub delay_in_milliseconds: i64,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    pub lending_rate_in_percent: f64,
}
