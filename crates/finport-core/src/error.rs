use crate::types::EnrichmentKind;
use thiserror::Error;

/// FinPort pipeline errors.
#[derive(Debug, Error)]
pub enum FinPortError {
    #[error("contact lookup failed: {0}")]
    ContactLookup(String),

    #[error("account detail fetch failed: {0}")]
    AccountFetch(String),

    #[error("upcoming payment lookup failed for account '{account_number}': {message}")]
    UpcomingPayment {
        account_number: String,
        message: String,
    },

    #[error("payoff computation failed for account '{fs_account_id}': {message}")]
    PayoffComputation {
        fs_account_id: String,
        message: String,
    },

    #[error("{0} batch discarded after a failing member")]
    EnrichmentBatch(EnrichmentKind),
}
