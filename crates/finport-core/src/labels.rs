use crate::types::{AccountCategory, RunFlags};
use serde::{Deserialize, Serialize};

/// Error surface shown by the presentation layer. Text resolution for these
/// keys lives entirely outside this crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    TechnicalError,
    NoAccounts,
}

impl MessageKey {
    pub fn as_key(self) -> &'static str {
        match self {
            Self::TechnicalError => "global.technical-error",
            Self::NoAccounts => "contract-list.error.no-accounts",
        }
    }
}

impl RunFlags {
    /// Synchronous flag-to-key mapping.
    ///
    /// The contact/fetch surface and a discarded upcoming-payment batch both
    /// map to the technical error; a discarded payoff batch intentionally
    /// does not. An empty result is its own distinct condition.
    pub fn message_key(&self) -> Option<MessageKey> {
        if self.contact_error || self.upays_failed {
            Some(MessageKey::TechnicalError)
        } else if self.no_accounts {
            Some(MessageKey::NoAccounts)
        } else {
            None
        }
    }
}

pub fn amount_label_key(amount_minor: i64) -> &'static str {
    if amount_minor > 0 {
        "contract-list.lbl-positive-amount"
    } else {
        "contract-list.lbl-negative-amount"
    }
}

pub fn category_label(category: AccountCategory) -> &'static str {
    match category {
        AccountCategory::Loan => "financing",
        AccountCategory::Lease => "lease",
    }
}
