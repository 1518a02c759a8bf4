//! Mock implementation of SellerRepository for testing

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{Seller, SellerPatch};
use crate::errors::DomainError;

use super::trait_::SellerRepository;

/// In-memory seller store.
///
/// Each call yields to the scheduler first so concurrent tests interleave the
/// way separate invocations against a real store would.
#[derive(Clone)]
pub struct MockSellerRepository {
    sellers: Arc<RwLock<HashMap<String, Seller>>>,
    writes: Arc<AtomicUsize>,
    unavailable: Arc<RwLock<bool>>,
}

impl MockSellerRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            sellers: Arc::new(RwLock::new(HashMap::new())),
            writes: Arc::new(AtomicUsize::new(0)),
            unavailable: Arc::new(RwLock::new(false)),
        }
    }

    /// Create a mock pre-populated with sellers
    pub async fn with_sellers(sellers: Vec<Seller>) -> Self {
        let repo = Self::new();
        {
            let mut store = repo.sellers.write().await;
            for seller in sellers {
                store.insert(seller.email.clone(), seller);
            }
        }
        repo
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail as if the store were unreachable
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    async fn check_available(&self) -> Result<(), DomainError> {
        tokio::task::yield_now().await;
        if *self.unavailable.read().await {
            return Err(DomainError::unavailable("seller store unreachable"));
        }
        Ok(())
    }
}

impl Default for MockSellerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SellerRepository for MockSellerRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Seller>, DomainError> {
        self.check_available().await?;
        let sellers = self.sellers.read().await;
        Ok(sellers.get(email).cloned())
    }

    async fn find_by_emails(&self, emails: &[String]) -> Result<Vec<Seller>, DomainError> {
        self.check_available().await?;
        let sellers = self.sellers.read().await;
        Ok(emails
            .iter()
            .filter_map(|email| sellers.get(email).cloned())
            .collect())
    }

    async fn create(&self, seller: Seller) -> Result<Seller, DomainError> {
        self.check_available().await?;
        let mut sellers = self.sellers.write().await;

        if sellers.contains_key(&seller.email) {
            return Err(DomainError::Validation {
                message: "Seller already registered".to_string(),
            });
        }

        sellers.insert(seller.email.clone(), seller.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(seller)
    }

    async fn update_if_version(
        &self,
        email: &str,
        expected_version: u64,
        patch: SellerPatch,
    ) -> Result<Option<Seller>, DomainError> {
        self.check_available().await?;
        let mut sellers = self.sellers.write().await;

        let Some(seller) = sellers.get_mut(email) else {
            return Ok(None);
        };
        if seller.version != expected_version {
            return Ok(None);
        }

        patch.apply_to(seller, Utc::now());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(seller.clone()))
    }
}
