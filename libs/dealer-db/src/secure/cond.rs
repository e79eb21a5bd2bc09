use sea_orm::{ColumnTrait, Condition};
use uuid::Uuid;

use crate::secure::{TenantId, TenantScopedEntity};

/// `tenant_col = tenant` for entity `E`.
///
/// Always AND-ed in front of caller filters, so a caller condition can only
/// narrow the result set further, never widen it to another tenant.
#[must_use]
pub fn tenant_condition<E>(tenant: TenantId) -> Condition
where
    E: TenantScopedEntity,
{
    Condition::all().add(E::tenant_col().eq(tenant.as_uuid()))
}

/// `key_col = id` for entity `E`.
#[must_use]
pub fn key_condition<E>(id: Uuid) -> Condition
where
    E: TenantScopedEntity,
{
    Condition::all().add(E::key_col().eq(id))
}
