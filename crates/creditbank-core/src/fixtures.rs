//! In-memory doubles for the remote seams.

use crate::error::{QuoteError, QuoteResult};
use crate::remote::{BoundsProvider, GroupStore};
use crate::types::{Bank, CreditBounds, Group, QuoteRequest, RatingLevel};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const BANK_ID: &str = "bank-vbank";
pub const BANK_NAME: &str = "vbank";
pub const DEFAULT_PASSWORD: &str = "0123456789";

pub fn credit_bounds() -> CreditBounds {
    CreditBounds {
        min_amount_in_euros: 10_000,
        max_amount_in_euros: 50_000,
        min_term_in_months: 6,
        max_term_in_months: 36,
        min_rating: RatingLevel::A,
        max_rating: RatingLevel::P,
    }
}

pub fn bank(credit_configuration: Option<CreditBounds>) -> Bank {
    Bank {
        id: BANK_ID.to_string(),
        name: BANK_NAME.to_string(),
        thumbnail_url: None,
        is_async: false,
        is_active: true,
        credit_configuration,
    }
}

pub fn group(id: &str, username: &str) -> Group {
    let stats = ["schufa", BANK_NAME, "jmsBankA"]
        .into_iter()
        .map(|name| (name.to_string(), 0))
        .collect::<BTreeMap<_, _>>();

    Group {
        id: id.to_string(),
        username: username.to_string(),
        password: DEFAULT_PASSWORD.to_string(),
        jms_queue: format!("Response{username}"),
        students: vec!["Max Mustermann".to_string(), "Thomas Müller".to_string()],
        stats,
        has_passed: false,
    }
}

pub fn three_groups() -> Vec<Group> {
    vec![
        group("61320a79410347e41dbea0f9", "LoanBrokerGruppe01"),
        group("61320a84befcde533be505c5", "LoanBrokerGruppe02"),
        group("62449e3d944f2af727e6f1fb", "LoanBrokerGruppe03"),
    ]
}

pub fn min_valid_request() -> QuoteRequest {
    QuoteRequest {
        amount_in_euros: Some("10000".to_string()),
        term_in_months: Some("6".to_string()),
        rating_level: Some("A".to_string()),
        delay_in_milliseconds: Some("0".to_string()),
        username: Some("LoanBrokerGruppe01".to_string()),
        password: Some(DEFAULT_PASSWORD.to_string()),
    }
}

/// Backend double that answers both seams and counts every call.
pub struct InMemoryBackend {
    bank: Mutex<QuoteResult<Bank>>,
    groups: Mutex<Vec<Group>>,
    update_failure: Mutex<Option<QuoteError>>,
    bank_reads: AtomicUsize,
    group_reads: AtomicUsize,
    updates: Mutex<Vec<(String, Group)>>,
}

impl InMemoryBackend {
    pub fn new(bank: Bank, groups: Vec<Group>) -> Self {
        Self {
            bank: Mutex::new(Ok(bank)),
            groups: Mutex::new(groups),
            update_failure: Mutex::new(None),
            bank_reads: AtomicUsize::new(0),
            group_reads: AtomicUsize::new(0),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn with_bounds(bounds: CreditBounds) -> Self {
        Self::new(bank(Some(bounds)), three_groups())
    }

    pub fn fail_bank_reads(&self, err: QuoteError) {
        *self.bank.lock().unwrap() = Err(err);
    }

    pub fn fail_updates(&self, err: QuoteError) {
        *self.update_failure.lock().unwrap() = Some(err);
    }

    pub fn bank_reads(&self) -> usize {
        self.bank_reads.load(Ordering::SeqCst)
    }

    pub fn group_reads(&self) -> usize {
        self.group_reads.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> Vec<(String, Group)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl BoundsProvider for InMemoryBackend {
    async fn get_bank(&self, _bank_id: &str) -> QuoteResult<Bank> {
        self.bank_reads.fetch_add(1, Ordering::SeqCst);
        self.bank.lock().unwrap().clone()
    }
}

#[async_trait]
impl GroupStore for InMemoryBackend {
    async fn list_groups(&self) -> QuoteResult<Vec<Group>> {
        self.group_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.groups.lock().unwrap().clone())
    }

    async fn update_group(&self, id: &str, group: &Group) -> QuoteResult<Group> {
        self.updates
            .lock()
            .unwrap()
            .push((id.to_string(), group.clone()));
        if let Some(err) = self.update_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(group.clone())
    }
}
