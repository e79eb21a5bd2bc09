use chrono::{Datelike, Utc};
use sea_orm::{ColumnTrait, Condition, NotSet, Set};
use uuid::Uuid;

use super::{DealershipService, require_non_empty};
use crate::domain::error::DomainError;
use crate::domain::models::{NewVehicle, VehicleQuery, VehicleStatus};
use crate::infra::storage::entity::vehicle;

const ENTITY: &str = "Vehicle";
const MAX_PAGE: u64 = 200;

impl DealershipService {
    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn list_vehicles(
        &self,
        query: &VehicleQuery,
    ) -> Result<Vec<vehicle::Model>, DomainError> {
        let mut cond = Condition::all();
        if let Some(brand) = &query.brand {
            cond = cond.add(vehicle::Column::Brand.eq(brand.as_str()));
        }
        if let Some(status) = query.status {
            cond = cond.add(vehicle::Column::Status.eq(status.as_str()));
        }
        if let Some(max) = query.max_price_cents {
            cond = cond.add(vehicle::Column::PriceCents.lte(max));
        }

        let rows = self
            .db
            .find::<vehicle::Entity>()
            .filter(cond)
            .order_by_desc(vehicle::Column::CreatedAt)
            .limit(query.limit.unwrap_or(50).min(MAX_PAGE))
            .offset(query.offset.unwrap_or(0))
            .all()
            .await
            .map_err(|e| DomainError::from_scope(ENTITY, e))?;
        Ok(rows)
    }

    /// # Errors
    /// Returns `DomainError::NotFound` if the vehicle does not exist for this tenant.
    pub async fn get_vehicle(&self, id: Uuid) -> Result<vehicle::Model, DomainError> {
        self.db
            .find_unique::<vehicle::Entity>(id)
            .await
            .map_err(|e| DomainError::from_scope(ENTITY, e))?
            .ok_or_else(|| DomainError::not_found(ENTITY))
    }

    /// Add a vehicle to inventory, subject to the tenant's vehicle quota.
    ///
    /// # Errors
    /// - `DomainError::Validation` for malformed input
    /// - `DomainError::QuotaExceeded` when `max_vehicles` is reached
    pub async fn create_vehicle(&self, input: NewVehicle) -> Result<vehicle::Model, DomainError> {
        let brand = require_non_empty("brand", &input.brand)?;
        let model = require_non_empty("model", &input.model)?;
        let newest = Utc::now().year() + 1;
        if !(1900..=newest).contains(&input.year) {
            return Err(DomainError::validation(
                "year",
                format!("must be between 1900 and {newest}"),
            ));
        }
        validate_price("price_cents", input.price_cents)?;

        let tenant = self.tenant_record().await?;
        self.ensure_quota::<vehicle::Entity>("vehicles", tenant.max_vehicles)
            .await?;

        let am = vehicle::ActiveModel {
            id: NotSet,
            tenant_id: NotSet,
            brand: Set(brand),
            model: Set(model),
            year: Set(input.year),
            vin: Set(input.vin.map(|v| v.trim().to_uppercase()).filter(|v| !v.is_empty())),
            price_cents: Set(input.price_cents),
            status: Set(VehicleStatus::Available.as_str().to_owned()),
            created_at: Set(Utc::now()),
        };
        Ok(self.db.create::<vehicle::Entity>(am).await?)
    }

    /// # Errors
    /// Returns `DomainError::NotFound` if the vehicle does not exist for this tenant.
    pub async fn update_vehicle_price(
        &self,
        id: Uuid,
        price_cents: i64,
    ) -> Result<vehicle::Model, DomainError> {
        validate_price("price_cents", price_cents)?;
        let am = vehicle::ActiveModel {
            price_cents: Set(price_cents),
            ..Default::default()
        };
        self.db
            .update::<vehicle::Entity>(id, am)
            .await
            .map_err(|e| DomainError::from_scope(ENTITY, e))
    }

    /// # Errors
    /// Returns `DomainError::NotFound` if the vehicle does not exist for this tenant.
    pub async fn set_vehicle_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
    ) -> Result<vehicle::Model, DomainError> {
        let am = vehicle::ActiveModel {
            status: Set(status.as_str().to_owned()),
            ..Default::default()
        };
        self.db
            .update::<vehicle::Entity>(id, am)
            .await
            .map_err(|e| DomainError::from_scope(ENTITY, e))
    }

    /// # Errors
    /// Returns `DomainError::NotFound` if the vehicle does not exist for this tenant.
    pub async fn delete_vehicle(&self, id: Uuid) -> Result<(), DomainError> {
        self.db
            .delete::<vehicle::Entity>(id)
            .await
            .map_err(|e| DomainError::from_scope(ENTITY, e))
    }
}

pub(super) fn validate_price(field: &'static str, cents: i64) -> Result<(), DomainError> {
    if cents < 0 {
        return Err(DomainError::validation(field, "must not be negative"));
    }
    Ok(())
}
