use crate::collaborators::AccountService;
use crate::error::FinPortError;
use crate::types::{ContractAccountDetail, FinancialProduct};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

/// Boundary normalization for due dates arriving as strings.
///
/// Unparsable input is treated the same as a missing date; the classifier
/// sorts both last within their bucket.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Fetches detailed contract records for a set of candidate accounts.
pub struct AccountDetailFetcher {
    accounts: Arc<dyn AccountService>,
}

impl AccountDetailFetcher {
    pub fn new(accounts: Arc<dyn AccountService>) -> Self {
        Self { accounts }
    }

    /// One candidate account number per product, order preserved, duplicates kept.
    pub fn account_numbers(products: &[FinancialProduct]) -> Vec<String> {
        products
            .iter()
            .map(|product| product.account_number.clone())
            .collect()
    }

    pub async fn fetch(
        &self,
        customer_number: u64,
        account_numbers: &[String],
        refresh: bool,
    ) -> Result<Vec<ContractAccountDetail>, FinPortError> {
        let details = self
            .accounts
            .find_accounts(customer_number, account_numbers, refresh)
            .await?;
        debug!(
            customer_number,
            requested = account_numbers.len(),
            returned = details.len(),
            "contract details fetched"
        );
        Ok(details)
    }
}
