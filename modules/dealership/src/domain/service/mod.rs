//! Tenant-facing dealership operations.
//!
//! A [`DealershipService`] is built per request for the resolved tenant and
//! only ever holds a [`TenantConn`], so nothing in here can reach another
//! tenant's rows.

use std::sync::Arc;

use dealer_db::DbHandle;
use dealer_db::secure::{ScopeError, TenantConn, TenantId, TenantScopedEntity};
use sea_orm::{Condition, FromQueryResult};

use super::error::DomainError;
use super::repo::TenantDirectory;
use crate::infra::storage::entity::tenant;

mod catalog;
mod notifications;
mod people;
mod sales;
mod settings;
mod vehicles;

pub struct DealershipService {
    db: TenantConn,
    directory: Arc<dyn TenantDirectory>,
}

impl DealershipService {
    #[must_use]
    pub fn new(db: &DbHandle, tenant: TenantId, directory: Arc<dyn TenantDirectory>) -> Self {
        Self {
            db: db.for_tenant(tenant),
            directory,
        }
    }

    #[must_use]
    pub fn tenant(&self) -> TenantId {
        self.db.tenant()
    }

    /// The bound tenant's own registry record (quotas, plan).
    async fn tenant_record(&self) -> Result<tenant::Model, DomainError> {
        self.directory
            .find_by_id(self.tenant().as_uuid())
            .await?
            .ok_or(DomainError::TenantUnavailable)
    }

    /// Fail with `QuotaExceeded` once the tenant already holds `limit` rows of `E`.
    async fn ensure_quota<E>(&self, resource: &'static str, limit: i32) -> Result<(), DomainError>
    where
        E: TenantScopedEntity,
        E::Model: FromQueryResult + Send + Sync,
    {
        let used = self.db.count::<E>(Condition::all()).await?;
        let limit_u64 = u64::try_from(limit).unwrap_or_default();
        if used >= limit_u64 {
            tracing::info!(
                tenant_id = %self.tenant(),
                resource,
                limit,
                "quota reached"
            );
            return Err(DomainError::QuotaExceeded { resource, limit });
        }
        Ok(())
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_owned())
}

/// Report a unique-index rejection on `field` as a validation error.
fn unique_or(field: &'static str, message: &'static str, err: ScopeError) -> DomainError {
    if err.is_unique_violation() {
        DomainError::validation(field, message)
    } else {
        err.into()
    }
}
