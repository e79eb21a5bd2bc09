//! Platform-level administration across all tenants.
//!
//! Runs on the unscoped [`GlobalConn`]; callers must already have been
//! authorized as platform super-admins.

use chrono::Utc;
use dealer_db::secure::{GlobalConn, TenantId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use uuid::Uuid;

use super::error::DomainError;
use crate::config::PlanQuotas;
use crate::infra::storage::entity::tenant::{self, Plan, TenantStatus};
use crate::infra::storage::entity::vehicle;

const SLUG_MAX_LEN: usize = 63;

/// Vehicle count for one tenant, as reported by [`PlatformAdmin::vehicle_totals`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantVehicleTotal {
    pub tenant_id: Uuid,
    pub vehicles: u64,
}

pub struct PlatformAdmin {
    db: GlobalConn,
    plans: PlanQuotas,
}

impl PlatformAdmin {
    #[must_use]
    pub fn new(db: GlobalConn, plans: PlanQuotas) -> Self {
        Self { db, plans }
    }

    /// Register a new tenant in `pending` state with its plan's quotas.
    ///
    /// # Errors
    /// - `DomainError::Validation` if the slug or name is malformed, or the slug is taken
    /// - `DomainError::Database` on storage failure
    pub async fn provision(
        &self,
        slug: &str,
        name: &str,
        plan: Plan,
    ) -> Result<tenant::Model, DomainError> {
        validate_slug(slug)?;
        if name.trim().is_empty() {
            return Err(DomainError::validation("name", "must not be empty"));
        }

        let taken = tenant::Entity::find()
            .filter(tenant::Column::Slug.eq(slug))
            .one(self.db.conn())
            .await?;
        if taken.is_some() {
            return Err(DomainError::validation("slug", "already in use"));
        }

        let quota = self.plans.for_plan(plan);
        let am = tenant::ActiveModel {
            id: Set(Uuid::new_v4()),
            slug: Set(slug.to_owned()),
            name: Set(name.trim().to_owned()),
            status: Set(TenantStatus::Pending),
            plan: Set(plan),
            max_users: Set(quota.max_users),
            max_vehicles: Set(quota.max_vehicles),
            created_at: Set(Utc::now()),
        };
        let created = am.insert(self.db.conn()).await?;
        tracing::info!(tenant_id = %created.id, slug, ?plan, "tenant provisioned");
        Ok(created)
    }

    /// Move a tenant through its lifecycle (approve, suspend, cancel).
    ///
    /// # Errors
    /// - `DomainError::NotFound` if no such tenant exists
    /// - `DomainError::Database` on storage failure
    pub async fn set_status(
        &self,
        id: TenantId,
        status: TenantStatus,
    ) -> Result<tenant::Model, DomainError> {
        let Some(current) = self.db.find_by_id::<tenant::Entity>(id.as_uuid()).await? else {
            return Err(DomainError::not_found("Tenant"));
        };
        let previous = current.status;
        let mut am = current.into_active_model();
        am.status = Set(status);
        let updated = am.update(self.db.conn()).await?;
        tracing::info!(tenant_id = %id, from = ?previous, to = ?status, "tenant status changed");
        Ok(updated)
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn list_tenants(&self) -> Result<Vec<tenant::Model>, DomainError> {
        Ok(tenant::Entity::find()
            .order_by_asc(tenant::Column::CreatedAt)
            .order_by_asc(tenant::Column::Slug)
            .all(self.db.conn())
            .await?)
    }

    /// Vehicle count per tenant across the whole platform.
    ///
    /// Tenants without vehicles are omitted.
    ///
    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn vehicle_totals(&self) -> Result<Vec<TenantVehicleTotal>, DomainError> {
        let rows: Vec<(Uuid, i64)> = vehicle::Entity::find()
            .select_only()
            .column(vehicle::Column::TenantId)
            .column_as(vehicle::Column::Id.count(), "vehicles")
            .group_by(vehicle::Column::TenantId)
            .order_by_asc(vehicle::Column::TenantId)
            .into_tuple()
            .all(self.db.conn())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(tenant_id, vehicles)| TenantVehicleTotal {
                tenant_id,
                vehicles: u64::try_from(vehicles).unwrap_or_default(),
            })
            .collect())
    }
}

fn validate_slug(slug: &str) -> Result<(), DomainError> {
    if slug.len() < 3 || slug.len() > SLUG_MAX_LEN {
        return Err(DomainError::validation(
            "slug",
            format!("must be 3 to {SLUG_MAX_LEN} characters"),
        ));
    }
    let valid_chars = slug
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !valid_chars || slug.starts_with('-') || slug.ends_with('-') {
        return Err(DomainError::validation(
            "slug",
            "lowercase letters, digits and inner hyphens only",
        ));
    }
    if slug == "www" {
        return Err(DomainError::validation("slug", "reserved"));
    }
    Ok(())
}
