#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Dealership module.
//!
//! Tenant-facing operations live in [`domain::service::DealershipService`]
//! and only ever see a tenant-scoped connection. Platform administration
//! ([`domain::platform::PlatformAdmin`]) and tenant resolution
//! ([`domain::tenant_resolver::TenantResolver`]) are the only consumers of
//! the unscoped path.

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use config::DealershipConfig;
pub use domain::error::DomainError;
pub use domain::platform::PlatformAdmin;
pub use domain::service::DealershipService;
pub use domain::tenant_resolver::TenantResolver;

use dealer_db::DbHandle;
use sea_orm_migration::MigratorTrait;

/// Bring the schema up to date.
///
/// # Errors
/// Returns the migration error if any step fails.
pub async fn migrate(db: &DbHandle) -> Result<(), sea_orm::DbErr> {
    tracing::info!("Running dealership database migrations");
    infra::storage::migrations::Migrator::up(db.global().conn(), None).await?;
    tracing::info!("Dealership database migrations completed successfully");
    Ok(())
}
