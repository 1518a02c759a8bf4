//! MySQL implementation of the VehicleRepository trait.
//!
//! Partial updates run as read-modify-write inside a transaction holding the
//! row lock, so `update_if` checks its condition and writes atomically.
//! Boosts are stored as a JSON array. Listings come back in `seq` order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{MySql, MySqlPool, Row, Transaction};
use uuid::Uuid;

use al_core::domain::entities::{Boost, Vehicle, VehiclePatch};
use al_core::errors::DomainError;
use al_core::repositories::{VehicleCondition, VehicleRepository};

use super::{column_error, query_error};

const SELECT_VEHICLE: &str = r#"
    SELECT id, seller_email, make, model, year, price, mileage, description,
           status, listing_status, listing_expires_at, is_featured, featured_at,
           certification_status, certification_requested_at, active_boosts,
           views, inquiries_count, sold_at, created_at, updated_at
    FROM vehicles
"#;

/// MySQL implementation of VehicleRepository
pub struct MySqlVehicleRepository {
    pool: MySqlPool,
}

impl MySqlVehicleRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_vehicle(row: &sqlx::mysql::MySqlRow) -> Result<Vehicle, DomainError> {
        let id: String = row.try_get("id").map_err(|e| column_error("id", e))?;
        let status: String = row.try_get("status").map_err(|e| column_error("status", e))?;
        let listing_status: String = row
            .try_get("listing_status")
            .map_err(|e| column_error("listing_status", e))?;
        let certification_status: String = row
            .try_get("certification_status")
            .map_err(|e| column_error("certification_status", e))?;
        let Json(active_boosts): Json<Vec<Boost>> = row
            .try_get("active_boosts")
            .map_err(|e| column_error("active_boosts", e))?;

        Ok(Vehicle {
            id: Uuid::parse_str(&id).map_err(|e| column_error("id", e))?,
            seller_email: row
                .try_get("seller_email")
                .map_err(|e| column_error("seller_email", e))?,
            make: row.try_get("make").map_err(|e| column_error("make", e))?,
            model: row.try_get("model").map_err(|e| column_error("model", e))?,
            year: row.try_get("year").map_err(|e| column_error("year", e))?,
            price: row.try_get("price").map_err(|e| column_error("price", e))?,
            mileage: row.try_get("mileage").map_err(|e| column_error("mileage", e))?,
            description: row
                .try_get("description")
                .map_err(|e| column_error("description", e))?,
            status: status.parse().map_err(|e| column_error("status", e))?,
            listing_status: listing_status
                .parse()
                .map_err(|e| column_error("listing_status", e))?,
            listing_expires_at: row
                .try_get::<Option<DateTime<Utc>>, _>("listing_expires_at")
                .map_err(|e| column_error("listing_expires_at", e))?,
            is_featured: row
                .try_get("is_featured")
                .map_err(|e| column_error("is_featured", e))?,
            featured_at: row
                .try_get::<Option<DateTime<Utc>>, _>("featured_at")
                .map_err(|e| column_error("featured_at", e))?,
            certification_status: certification_status
                .parse()
                .map_err(|e| column_error("certification_status", e))?,
            certification_requested_at: row
                .try_get::<Option<DateTime<Utc>>, _>("certification_requested_at")
                .map_err(|e| column_error("certification_requested_at", e))?,
            active_boosts,
            views: row.try_get("views").map_err(|e| column_error("views", e))?,
            inquiries_count: row
                .try_get("inquiries_count")
                .map_err(|e| column_error("inquiries_count", e))?,
            sold_at: row
                .try_get::<Option<DateTime<Utc>>, _>("sold_at")
                .map_err(|e| column_error("sold_at", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column_error("created_at", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| column_error("updated_at", e))?,
        })
    }

    async fn fetch_many(&self, clause: &str, bind: &str) -> Result<Vec<Vehicle>, DomainError> {
        let query = format!("{} {} ORDER BY seq", SELECT_VEHICLE, clause);
        let rows = sqlx::query(&query)
            .bind(bind)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        rows.iter().map(Self::row_to_vehicle).collect()
    }

    /// Lock the row, check the guard, apply the patch, write it back
    async fn patch_locked(
        &self,
        id: Uuid,
        condition: Option<VehicleCondition>,
        patch: &VehiclePatch,
    ) -> Result<Option<Vehicle>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(query_error)?;

        let query = format!("{} WHERE id = ? FOR UPDATE", SELECT_VEHICLE);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?;

        let Some(row) = row else {
            tx.rollback().await.map_err(query_error)?;
            return Ok(None);
        };
        let mut vehicle = Self::row_to_vehicle(&row)?;

        if condition.is_some_and(|condition| !condition.holds_for(&vehicle)) {
            tx.rollback().await.map_err(query_error)?;
            return Ok(None);
        }

        patch.apply_to(&mut vehicle, Utc::now());
        Self::write_row(&mut tx, &vehicle).await?;
        tx.commit().await.map_err(query_error)?;

        Ok(Some(vehicle))
    }

    async fn write_row(
        tx: &mut Transaction<'_, MySql>,
        vehicle: &Vehicle,
    ) -> Result<(), DomainError> {
        let query = r#"
            UPDATE vehicles SET
                status = ?,
                listing_status = ?,
                listing_expires_at = ?,
                is_featured = ?,
                featured_at = ?,
                certification_status = ?,
                certification_requested_at = ?,
                active_boosts = ?,
                views = ?,
                inquiries_count = ?,
                sold_at = ?,
                updated_at = ?
            WHERE id = ?
        "#;

        sqlx::query(query)
            .bind(vehicle.status.as_str())
            .bind(vehicle.listing_status.as_str())
            .bind(vehicle.listing_expires_at)
            .bind(vehicle.is_featured)
            .bind(vehicle.featured_at)
            .bind(vehicle.certification_status.as_str())
            .bind(vehicle.certification_requested_at)
            .bind(Json(&vehicle.active_boosts))
            .bind(vehicle.views)
            .bind(vehicle.inquiries_count)
            .bind(vehicle.sold_at)
            .bind(vehicle.updated_at)
            .bind(vehicle.id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(query_error)?;
        Ok(())
    }
}

#[async_trait]
impl VehicleRepository for MySqlVehicleRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_VEHICLE);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;

        row.as_ref().map(Self::row_to_vehicle).transpose()
    }

    async fn find_by_seller(&self, seller_email: &str) -> Result<Vec<Vehicle>, DomainError> {
        self.fetch_many("WHERE seller_email = ?", seller_email).await
    }

    async fn find_all_published(&self) -> Result<Vec<Vehicle>, DomainError> {
        self.fetch_many("WHERE status = ?", "published").await
    }

    async fn create(&self, vehicle: Vehicle) -> Result<Vehicle, DomainError> {
        let query = r#"
            INSERT INTO vehicles (
                id, seller_email, make, model, year, price, mileage, description,
                status, listing_status, listing_expires_at, is_featured, featured_at,
                certification_status, certification_requested_at, active_boosts,
                views, inquiries_count, sold_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(vehicle.id.to_string())
            .bind(&vehicle.seller_email)
            .bind(&vehicle.make)
            .bind(&vehicle.model)
            .bind(vehicle.year)
            .bind(vehicle.price)
            .bind(vehicle.mileage)
            .bind(&vehicle.description)
            .bind(vehicle.status.as_str())
            .bind(vehicle.listing_status.as_str())
            .bind(vehicle.listing_expires_at)
            .bind(vehicle.is_featured)
            .bind(vehicle.featured_at)
            .bind(vehicle.certification_status.as_str())
            .bind(vehicle.certification_requested_at)
            .bind(Json(&vehicle.active_boosts))
            .bind(vehicle.views)
            .bind(vehicle.inquiries_count)
            .bind(vehicle.sold_at)
            .bind(vehicle.created_at)
            .bind(vehicle.updated_at)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(vehicle)
    }

    async fn update(&self, id: Uuid, patch: VehiclePatch) -> Result<Option<Vehicle>, DomainError> {
        self.patch_locked(id, None, &patch).await
    }

    async fn update_if(
        &self,
        id: Uuid,
        condition: VehicleCondition,
        patch: VehiclePatch,
    ) -> Result<Option<Vehicle>, DomainError> {
        self.patch_locked(id, Some(condition), &patch).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected() > 0)
    }
}
