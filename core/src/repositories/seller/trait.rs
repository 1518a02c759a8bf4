//! Seller repository trait defining the interface for seller persistence.
//!
//! Sellers are keyed by normalized email. Every write bumps the record's
//! `version`, which backs the compare-and-set used by the credit ledger.

use async_trait::async_trait;

use crate::domain::entities::{Seller, SellerPatch};
use crate::errors::DomainError;

/// Repository trait for Seller persistence operations
///
/// # Example Implementation
/// ```no_run
/// use async_trait::async_trait;
/// use al_core::domain::entities::{Seller, SellerPatch};
/// use al_core::errors::DomainError;
/// use al_core::repositories::SellerRepository;
///
/// struct DocumentSellerRepository;
///
/// #[async_trait]
/// impl SellerRepository for DocumentSellerRepository {
///     async fn find_by_email(&self, email: &str) -> Result<Option<Seller>, DomainError> {
///         Ok(None)
///     }
///
///     async fn find_by_emails(&self, emails: &[String]) -> Result<Vec<Seller>, DomainError> {
///         Ok(Vec::new())
///     }
///
///     async fn create(&self, seller: Seller) -> Result<Seller, DomainError> {
///         Ok(seller)
///     }
///
///     async fn update_if_version(
///         &self,
///         email: &str,
///         expected_version: u64,
///         patch: SellerPatch,
///     ) -> Result<Option<Seller>, DomainError> {
///         Ok(None)
///     }
/// }
/// ```
#[async_trait]
pub trait SellerRepository: Send + Sync {
    /// Find a seller by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<Seller>, DomainError>;

    /// Batched lookup used by the reconciler.
    ///
    /// Emails that match no seller are simply absent from the result.
    async fn find_by_emails(&self, emails: &[String]) -> Result<Vec<Seller>, DomainError>;

    /// Create a new seller
    ///
    /// # Returns
    /// * `Err(DomainError::Validation)` - A seller with this email already exists
    async fn create(&self, seller: Seller) -> Result<Seller, DomainError>;

    /// Apply `patch` only if the stored version still equals `expected_version`.
    ///
    /// # Returns
    /// * `Ok(Some(Seller))` - Patch applied, the updated seller (version bumped)
    /// * `Ok(None)` - Seller missing or the version moved on
    async fn update_if_version(
        &self,
        email: &str,
        expected_version: u64,
        patch: SellerPatch,
    ) -> Result<Option<Seller>, DomainError>;
}
