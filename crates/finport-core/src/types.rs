use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One contract candidate from the customer's product portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinancialProduct {
    pub account_number: String,
    /// Opaque image payload; URL construction belongs to the presentation layer.
    pub vehicle_image_data: String,
}

/// Identity resolved once per session and cached thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub customer_number: u64,
    pub first_name: Option<String>,
    pub financial_products: Vec<FinancialProduct>,
}

/// Uniform result of contact resolution, cached or remote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactInfo {
    pub customer_number: u64,
    pub first_name: Option<String>,
    pub financial_products: Vec<FinancialProduct>,
}

impl From<Identity> for ContactInfo {
    fn from(identity: Identity) -> Self {
        Self {
            customer_number: identity.customer_number,
            first_name: identity.first_name,
            financial_products: identity.financial_products,
        }
    }
}

/// Authoritative per-contract record from the account detail lookup.
///
/// Downstream enrichment keys off `account_number` (upcoming payments) and
/// `fs_account_id` (payoff computation). Amounts are minor units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractAccountDetail {
    pub account_number: String,
    pub fs_account_id: String,
    pub current_balance_minor: i64,
    pub total_amount_due_minor: i64,
    /// Missing and unparsable due dates are both normalized to `None`.
    pub next_payment_due_date: Option<NaiveDate>,
    pub status_category_code: String,
    pub portfolio_code: String,
    pub last_payment_amount_minor: Option<i64>,
    pub last_payment_date: Option<NaiveDate>,
}

impl ContractAccountDetail {
    pub fn is_past_due(&self) -> bool {
        self.current_balance_minor > 0
    }

    /// A due date is shown only for contracts that are not past due.
    pub fn show_due_date(&self) -> bool {
        !self.is_past_due() && self.next_payment_due_date.is_some()
    }

    pub fn has_last_payment(&self) -> bool {
        self.last_payment_amount_minor.is_some() && self.last_payment_date.is_some()
    }
}

/// Upcoming scheduled payment for one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledItem {
    pub account_number: String,
    pub due_date: NaiveDate,
    pub amount_minor: i64,
}

/// Payoff computation result for one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payoff {
    pub fs_account_id: String,
    pub amount_minor: i64,
    pub error: bool,
}

impl Payoff {
    /// Errored marker used when the payoff service cannot answer at all.
    pub fn errored(fs_account_id: impl Into<String>) -> Self {
        Self {
            fs_account_id: fs_account_id.into(),
            amount_minor: 0,
            error: true,
        }
    }
}

/// Upcoming payment lookup reply; absent items are a valid answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpcomingPaymentReply {
    pub account_number: String,
    pub scheduled_item: Option<ScheduledItem>,
    pub error: bool,
}

impl UpcomingPaymentReply {
    pub fn errored(account_number: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            scheduled_item: None,
            error: true,
        }
    }
}

/// Payment-status bucket of a classified contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStanding {
    PastDue,
    Current,
    Paid,
}

/// Account portfolio category from the external policy collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    Loan,
    Lease,
}

/// User activity reported to the audit boundary after a successful fetch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    LegitimizationCompleted,
    MyAccountLogin,
}

impl ActivityKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::LegitimizationCompleted => "legitimization-completed",
            Self::MyAccountLogin => "my-account-login",
        }
    }
}

/// Enrichment batch discriminator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentKind {
    UpcomingPayments,
    Payoffs,
}

impl fmt::Display for EnrichmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpcomingPayments => f.write_str("upcoming-payments"),
            Self::Payoffs => f.write_str("payoffs"),
        }
    }
}

/// Independent failure flags accumulated over one pipeline run.
///
/// A fetch-stage failure is folded into the `contact_error` surface; the two
/// enrichment flags never suppress the classified contract list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunFlags {
    pub contact_error: bool,
    pub upays_failed: bool,
    pub payoffs_failed: bool,
    pub no_accounts: bool,
}

/// Single result value of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractOverview {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub customer_number: Option<u64>,
    pub first_name: Option<String>,
    pub financial_products: Vec<FinancialProduct>,
    /// Classified and ordered: PastDue ++ Current ++ Paid.
    pub contracts: Vec<ContractAccountDetail>,
    pub scheduled_payments: Vec<ScheduledItem>,
    pub payoffs: Vec<Payoff>,
    pub flags: RunFlags,
}

impl ContractOverview {
    pub fn contract(&self, account_number: &str) -> Option<&ContractAccountDetail> {
        self.contracts
            .iter()
            .find(|contract| contract.account_number == account_number)
    }

    pub fn scheduled_payment(&self, account_number: &str) -> Option<&ScheduledItem> {
        self.scheduled_payments
            .iter()
            .find(|item| item.account_number == account_number)
    }

    pub fn payoff(&self, fs_account_id: &str) -> Option<&Payoff> {
        self.payoffs
            .iter()
            .find(|payoff| payoff.fs_account_id == fs_account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(balance: i64, due: i64) -> ContractAccountDetail {
        ContractAccountDetail {
            account_number: "A1".to_string(),
            fs_account_id: "FS-A1".to_string(),
            current_balance_minor: balance,
            total_amount_due_minor: due,
            next_payment_due_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            status_category_code: "active".to_string(),
            portfolio_code: "LN".to_string(),
            last_payment_amount_minor: None,
            last_payment_date: None,
        }
    }

    #[test]
    fn due_date_hidden_for_past_due_contracts() {
        let contract = detail(10_000, 10_000);
        assert!(contract.is_past_due());
        assert!(!contract.show_due_date());

        let contract = detail(0, 5_000);
        assert!(contract.show_due_date());
    }

    #[test]
    fn last_payment_requires_both_fields() {
        let mut contract = detail(0, 0);
        assert!(!contract.has_last_payment());

        contract.last_payment_amount_minor = Some(4_200);
        assert!(!contract.has_last_payment());

        contract.last_payment_date = NaiveDate::from_ymd_opt(2023, 12, 1);
        assert!(contract.has_last_payment());
    }
}
