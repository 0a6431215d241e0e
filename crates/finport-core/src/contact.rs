use crate::collaborators::ContactDirectory;
use crate::error::FinPortError;
use crate::session::SessionCache;
use crate::types::{ContactInfo, Identity};
use std::sync::Arc;
use tracing::debug;

/// Resolves the session identity, from cache when possible.
pub struct ContactResolver {
    directory: Arc<dyn ContactDirectory>,
    session: Arc<SessionCache>,
}

impl ContactResolver {
    pub fn new(directory: Arc<dyn ContactDirectory>, session: Arc<SessionCache>) -> Self {
        Self { directory, session }
    }

    /// Cache-first resolution.
    ///
    /// `refresh` bypasses the cache read and skips the write-through, leaving
    /// any cached identity untouched. Failures propagate to the caller, which
    /// owns error reporting for this stage.
    pub async fn resolve(&self, refresh: bool) -> Result<ContactInfo, FinPortError> {
        if !refresh {
            if let Some(identity) = self.session.get().await {
                if !identity.financial_products.is_empty() {
                    debug!(
                        customer_number = identity.customer_number,
                        "contact resolved from session cache"
                    );
                    return Ok(ContactInfo::from(identity));
                }
            }
        }

        let contact = self.directory.find_contact().await?;
        if !refresh {
            self.session
                .store(Identity {
                    customer_number: contact.customer_number,
                    first_name: contact.first_name.clone(),
                    financial_products: contact.financial_products.clone(),
                })
                .await;
        }

        Ok(contact)
    }
}
