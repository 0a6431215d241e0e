use crate::error::FinPortError;
use crate::types::{
    AccountCategory, ActivityKind, ContactInfo, ContractAccountDetail, Payoff,
    UpcomingPaymentReply,
};
use async_trait::async_trait;

/// Remote contact lookup keyed by the ambient session identity.
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    async fn find_contact(&self) -> Result<ContactInfo, FinPortError>;
}

/// Detailed contract record lookup for a set of candidate accounts.
///
/// A failure here is terminal for the whole run; nothing downstream can be
/// computed without contract details.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn find_accounts(
        &self,
        customer_number: u64,
        account_numbers: &[String],
        refresh: bool,
    ) -> Result<Vec<ContractAccountDetail>, FinPortError>;
}

/// Upcoming scheduled-payment lookup, keyed by account number.
#[async_trait]
pub trait UpcomingPaymentService: Send + Sync {
    async fn find_upcoming(
        &self,
        account_number: &str,
        refresh: bool,
    ) -> Result<UpcomingPaymentReply, FinPortError>;
}

/// Payoff computation, keyed by the financial-system account id.
#[async_trait]
pub trait PayoffService: Send + Sync {
    async fn calculate_payoff(
        &self,
        fs_account_id: &str,
        refresh: bool,
    ) -> Result<Payoff, FinPortError>;
}

/// External account classification policy.
pub trait AccountPolicy: Send + Sync {
    fn is_active_account(&self, status_category_code: &str) -> bool;

    fn account_category(&self, portfolio_code: &str) -> AccountCategory;
}

/// Observability sink for stage failures. Must never fail itself.
pub trait ErrorSink: Send + Sync {
    fn report(&self, context: &str, error: &FinPortError);
}

/// Audit boundary for user-activity events. Fire-and-forget.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn log_user_activity(
        &self,
        customer_number: u64,
        account_numbers: &[String],
        kind: ActivityKind,
    );
}
