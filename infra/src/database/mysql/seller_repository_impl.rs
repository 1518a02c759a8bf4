//! MySQL implementation of the SellerRepository trait.
//!
//! The `version` column backs the compare-and-set used by the credit ledger:
//! an update only lands while the stored version still matches the one the
//! caller read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use tracing::debug;

use al_core::domain::entities::{PlanKey, Seller, SellerPatch};
use al_core::errors::DomainError;
use al_core::repositories::SellerRepository;

use super::{column_error, query_error};

const SELECT_SELLER: &str = r#"
    SELECT email, subscription_plan, plan_expiry_date, featured_credits,
           used_certifications, version, updated_at
    FROM sellers
"#;

/// MySQL implementation of SellerRepository
pub struct MySqlSellerRepository {
    pool: MySqlPool,
}

impl MySqlSellerRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_seller(row: &sqlx::mysql::MySqlRow) -> Result<Seller, DomainError> {
        let plan: String = row
            .try_get("subscription_plan")
            .map_err(|e| column_error("subscription_plan", e))?;

        Ok(Seller {
            email: row.try_get("email").map_err(|e| column_error("email", e))?,
            subscription_plan: PlanKey::from(plan),
            plan_expiry_date: row
                .try_get("plan_expiry_date")
                .map_err(|e| column_error("plan_expiry_date", e))?,
            featured_credits: row
                .try_get("featured_credits")
                .map_err(|e| column_error("featured_credits", e))?,
            used_certifications: row
                .try_get("used_certifications")
                .map_err(|e| column_error("used_certifications", e))?,
            version: row.try_get("version").map_err(|e| column_error("version", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| column_error("updated_at", e))?,
        })
    }
}

#[async_trait]
impl SellerRepository for MySqlSellerRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Seller>, DomainError> {
        let query = format!("{} WHERE email = ? LIMIT 1", SELECT_SELLER);

        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;

        row.as_ref().map(Self::row_to_seller).transpose()
    }

    async fn find_by_emails(&self, emails: &[String]) -> Result<Vec<Seller>, DomainError> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; emails.len()].join(", ");
        let query = format!("{} WHERE email IN ({})", SELECT_SELLER, placeholders);

        let mut statement = sqlx::query(&query);
        for email in emails {
            statement = statement.bind(email);
        }

        let rows = statement.fetch_all(&self.pool).await.map_err(query_error)?;
        rows.iter().map(Self::row_to_seller).collect()
    }

    async fn create(&self, seller: Seller) -> Result<Seller, DomainError> {
        let query = r#"
            INSERT INTO sellers (
                email, subscription_plan, plan_expiry_date, featured_credits,
                used_certifications, version, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(&seller.email)
            .bind(seller.subscription_plan.as_str())
            .bind(&seller.plan_expiry_date)
            .bind(seller.featured_credits)
            .bind(seller.used_certifications)
            .bind(seller.version)
            .bind(seller.updated_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(seller),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(DomainError::Validation {
                    message: "Seller already exists".to_string(),
                })
            }
            Err(e) => Err(query_error(e)),
        }
    }

    async fn update_if_version(
        &self,
        email: &str,
        expected_version: u64,
        patch: SellerPatch,
    ) -> Result<Option<Seller>, DomainError> {
        let Some(mut seller) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        if seller.version != expected_version {
            return Ok(None);
        }
        patch.apply_to(&mut seller, Utc::now());

        let query = r#"
            UPDATE sellers SET
                subscription_plan = ?,
                plan_expiry_date = ?,
                featured_credits = ?,
                used_certifications = ?,
                version = version + 1,
                updated_at = ?
            WHERE email = ? AND version = ?
        "#;

        let result = sqlx::query(query)
            .bind(seller.subscription_plan.as_str())
            .bind(&seller.plan_expiry_date)
            .bind(seller.featured_credits)
            .bind(seller.used_certifications)
            .bind(seller.updated_at)
            .bind(email)
            .bind(expected_version)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            debug!(email, expected_version, "Seller version moved on");
            return Ok(None);
        }
        Ok(Some(seller))
    }
}
