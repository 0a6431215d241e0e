//! Collaborator adapters for the finport pipeline.
//!
//! Deterministic fixtures for local runs and integration tests, always-fail
//! variants for failure-path testing, and tracing-backed observability sinks.

#![deny(unsafe_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use finport_core::{
    parse_due_date, AccountCategory, AccountPolicy, AccountService, ActivityKind, ActivityLog,
    ContactDirectory, ContactInfo, ContractAccountDetail, ErrorSink, FinPortError,
    FinancialProduct, Payoff, PayoffService, ScheduledItem, UpcomingPaymentReply,
    UpcomingPaymentService,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info};

fn fixture_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("fixture date must be valid")
}

/// Deterministic contact directory fixture.
///
/// Serves one customer with three active financing contracts and one
/// terminated contract. Counts remote lookups so tests can assert the
/// session-cache short circuit.
#[derive(Debug, Default)]
pub struct FixtureContactDirectory {
    calls: AtomicUsize,
}

impl FixtureContactDirectory {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContactDirectory for FixtureContactDirectory {
    async fn find_contact(&self) -> Result<ContactInfo, FinPortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ContactInfo {
            customer_number: 1_004_217,
            first_name: Some("Avery".to_string()),
            financial_products: vec![
                FinancialProduct {
                    account_number: "A1".to_string(),
                    vehicle_image_data: "Image-100-A1".to_string(),
                },
                FinancialProduct {
                    account_number: "A2".to_string(),
                    vehicle_image_data: "Image-100-A2".to_string(),
                },
                FinancialProduct {
                    account_number: "A3".to_string(),
                    vehicle_image_data: "Image-100-A3".to_string(),
                },
                FinancialProduct {
                    account_number: "T9".to_string(),
                    vehicle_image_data: "Image-100-T9".to_string(),
                },
            ],
        })
    }
}

/// Contact directory that always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingContactDirectory;

#[async_trait]
impl ContactDirectory for FailingContactDirectory {
    async fn find_contact(&self) -> Result<ContactInfo, FinPortError> {
        Err(FinPortError::ContactLookup(
            "contact directory unavailable".to_string(),
        ))
    }
}

/// Deterministic account detail fixture matching `FixtureContactDirectory`.
#[derive(Debug, Default)]
pub struct FixtureAccountService {
    calls: AtomicUsize,
}

impl FixtureAccountService {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn detail(
        account: &str,
        balance: i64,
        amount_due: i64,
        due: &str,
        status: &str,
    ) -> ContractAccountDetail {
        ContractAccountDetail {
            account_number: account.to_string(),
            fs_account_id: format!("FS-{account}"),
            current_balance_minor: balance,
            total_amount_due_minor: amount_due,
            next_payment_due_date: parse_due_date(due),
            status_category_code: status.to_string(),
            portfolio_code: "LN".to_string(),
            last_payment_amount_minor: Some(42_500),
            last_payment_date: Some(fixture_date(2023, 12, 1)),
        }
    }
}

#[async_trait]
impl AccountService for FixtureAccountService {
    async fn find_accounts(
        &self,
        _customer_number: u64,
        account_numbers: &[String],
        _refresh: bool,
    ) -> Result<Vec<ContractAccountDetail>, FinPortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let catalog = vec![
            Self::detail("A1", 10_000, 10_000, "2024-01-01", "active"),
            Self::detail("A2", 0, 5_000, "2024-03-01", "active"),
            Self::detail("A3", 0, 0, "2024-02-01", "active"),
            Self::detail("T9", 0, 0, "", "terminated"),
        ];

        Ok(catalog
            .into_iter()
            .filter(|detail| account_numbers.contains(&detail.account_number))
            .collect::<Vec<_>>())
    }
}

/// Account service that always fails, making the whole run halt.
#[derive(Debug, Clone, Default)]
pub struct FailingAccountService;

#[async_trait]
impl AccountService for FailingAccountService {
    async fn find_accounts(
        &self,
        _customer_number: u64,
        _account_numbers: &[String],
        _refresh: bool,
    ) -> Result<Vec<ContractAccountDetail>, FinPortError> {
        Err(FinPortError::AccountFetch(
            "account backend unavailable".to_string(),
        ))
    }
}

/// Deterministic upcoming-payment fixture: one scheduled item per account.
#[derive(Debug)]
pub struct FixtureUpcomingPaymentService {
    calls: AtomicUsize,
    schedule: BTreeMap<String, (NaiveDate, i64)>,
}

impl Default for FixtureUpcomingPaymentService {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            schedule: BTreeMap::from([
                ("A1".to_string(), (fixture_date(2024, 1, 1), 10_000)),
                ("A2".to_string(), (fixture_date(2024, 3, 1), 5_000)),
                ("A3".to_string(), (fixture_date(2024, 2, 1), 4_200)),
            ]),
        }
    }
}

impl FixtureUpcomingPaymentService {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpcomingPaymentService for FixtureUpcomingPaymentService {
    async fn find_upcoming(
        &self,
        account_number: &str,
        _refresh: bool,
    ) -> Result<UpcomingPaymentReply, FinPortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scheduled_item =
            self.schedule
                .get(account_number)
                .map(|(due_date, amount_minor)| ScheduledItem {
                    account_number: account_number.to_string(),
                    due_date: *due_date,
                    amount_minor: *amount_minor,
                });

        Ok(UpcomingPaymentReply {
            account_number: account_number.to_string(),
            scheduled_item,
            error: false,
        })
    }
}

/// Upcoming-payment service that answers with an embedded error for one
/// configured account and succeeds everywhere else.
#[derive(Debug)]
pub struct FlakyUpcomingPaymentService {
    failing_account: String,
    inner: FixtureUpcomingPaymentService,
}

impl FlakyUpcomingPaymentService {
    pub fn new(failing_account: impl Into<String>) -> Self {
        Self {
            failing_account: failing_account.into(),
            inner: FixtureUpcomingPaymentService::default(),
        }
    }
}

#[async_trait]
impl UpcomingPaymentService for FlakyUpcomingPaymentService {
    async fn find_upcoming(
        &self,
        account_number: &str,
        refresh: bool,
    ) -> Result<UpcomingPaymentReply, FinPortError> {
        if account_number == self.failing_account {
            return Ok(UpcomingPaymentReply::errored(account_number));
        }
        self.inner.find_upcoming(account_number, refresh).await
    }
}

/// Deterministic payoff fixture.
#[derive(Debug)]
pub struct FixturePayoffService {
    calls: AtomicUsize,
    amounts: BTreeMap<String, i64>,
}

impl Default for FixturePayoffService {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            amounts: BTreeMap::from([
                ("FS-A1".to_string(), 1_250_000),
                ("FS-A2".to_string(), 860_000),
                ("FS-A3".to_string(), 0),
            ]),
        }
    }
}

impl FixturePayoffService {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PayoffService for FixturePayoffService {
    async fn calculate_payoff(
        &self,
        fs_account_id: &str,
        _refresh: bool,
    ) -> Result<Payoff, FinPortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Payoff {
            fs_account_id: fs_account_id.to_string(),
            amount_minor: self.amounts.get(fs_account_id).copied().unwrap_or(0),
            error: false,
        })
    }
}

/// Payoff service that fails at the transport level for every account.
#[derive(Debug, Clone, Default)]
pub struct AlwaysFailPayoffService;

#[async_trait]
impl PayoffService for AlwaysFailPayoffService {
    async fn calculate_payoff(
        &self,
        fs_account_id: &str,
        _refresh: bool,
    ) -> Result<Payoff, FinPortError> {
        Err(FinPortError::PayoffComputation {
            fs_account_id: fs_account_id.to_string(),
            message: "payoff backend unavailable".to_string(),
        })
    }
}

/// Status-code driven account policy.
///
/// An account is active when its status category code is in the active set;
/// lease portfolio codes map to the lease category, everything else is a loan.
#[derive(Debug, Clone)]
pub struct StatusCategoryPolicy {
    active_codes: BTreeSet<String>,
    lease_codes: BTreeSet<String>,
}

impl Default for StatusCategoryPolicy {
    fn default() -> Self {
        Self {
            active_codes: BTreeSet::from(["active".to_string(), "delinquent".to_string()]),
            lease_codes: BTreeSet::from(["LS".to_string()]),
        }
    }
}

impl AccountPolicy for StatusCategoryPolicy {
    fn is_active_account(&self, status_category_code: &str) -> bool {
        self.active_codes.contains(status_category_code)
    }

    fn account_category(&self, portfolio_code: &str) -> AccountCategory {
        if self.lease_codes.contains(portfolio_code) {
            AccountCategory::Lease
        } else {
            AccountCategory::Loan
        }
    }
}

/// Error sink backed by the tracing subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, context: &str, err: &FinPortError) {
        error!(context, error = %err, "pipeline stage failure reported");
    }
}

/// Activity log backed by the tracing subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingActivityLog;

#[async_trait]
impl ActivityLog for TracingActivityLog {
    async fn log_user_activity(
        &self,
        customer_number: u64,
        account_numbers: &[String],
        kind: ActivityKind,
    ) {
        info!(
            customer_number,
            kind = kind.name(),
            accounts = ?account_numbers,
            "user activity"
        );
    }
}
