use async_trait::async_trait;
use uuid::Uuid;

use super::error::DomainError;
use crate::infra::storage::entity::tenant;

/// Read access to the platform's tenant registry.
///
/// Backed by the unscoped connection: tenant records are global.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<tenant::Model>, DomainError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<tenant::Model>, DomainError>;
}
