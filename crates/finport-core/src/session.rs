use crate::types::Identity;
use tokio::sync::RwLock;

/// Per-session identity cache.
///
/// Read before contact resolution, written at most once per session on the
/// first successful non-refresh resolution. A populated cache is never
/// overwritten.
#[derive(Debug, Default)]
pub struct SessionCache {
    identity: RwLock<Option<Identity>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<Identity> {
        self.identity.read().await.clone()
    }

    /// Write-once store. Returns false when an identity was already cached.
    pub async fn store(&self, identity: Identity) -> bool {
        let mut slot = self.identity.write().await;
        if slot.is_some() {
            return false;
        }
        *slot = Some(identity);
        true
    }

    pub async fn is_populated(&self) -> bool {
        self.identity.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FinancialProduct;

    fn identity(customer_number: u64) -> Identity {
        Identity {
            customer_number,
            first_name: Some("Avery".to_string()),
            financial_products: vec![FinancialProduct {
                account_number: "A1".to_string(),
                vehicle_image_data: "img-a1".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn starts_empty() {
        let cache = SessionCache::new();
        assert!(!cache.is_populated().await);
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn store_is_write_once() {
        let cache = SessionCache::new();
        assert!(cache.store(identity(1)).await);
        assert!(!cache.store(identity(2)).await);

        let cached = cache.get().await.unwrap();
        assert_eq!(cached.customer_number, 1);
    }
}
