use sea_orm::EntityTrait;
use uuid::Uuid;

/// Contract for entities whose rows belong to exactly one tenant.
///
/// The isolation rules in [`TenantConn`](super::TenantConn) are written once
/// against this trait, so adding a new tenant-owned table only requires
/// describing where its tenant and key live.
///
/// # Example (Manual Implementation)
/// ```rust,ignore
/// impl TenantScopedEntity for vehicle::Entity {
///     fn tenant_col() -> Self::Column {
///         vehicle::Column::TenantId
///     }
///     fn key_col() -> Self::Column {
///         vehicle::Column::Id
///     }
///     fn tenant_of(model: &Self::Model) -> Uuid {
///         model.tenant_id
///     }
/// }
/// ```
///
/// # Example (Using Derive Macro)
/// ```rust,ignore
/// #[derive(Clone, Debug, PartialEq, DeriveEntityModel, TenantScoped)]
/// #[sea_orm(table_name = "vehicles")]
/// #[scoped(tenant_col = "tenant_id", key_col = "id")]
/// pub struct Model { /* ... */ }
/// ```
pub trait TenantScopedEntity: EntityTrait {
    /// Column holding the owning tenant's id. Immutable after insert.
    fn tenant_col() -> Self::Column;

    /// Globally unique `Uuid` key used by point lookups, updates and deletes.
    fn key_col() -> Self::Column;

    /// Reads the owning tenant back from a fetched row.
    fn tenant_of(model: &Self::Model) -> Uuid;
}

/// Marker for tenant-scoped entities with at most one row per tenant.
///
/// The tenant column must carry a unique index; it is the conflict target
/// of [`TenantConn::upsert`](super::TenantConn::upsert).
pub trait TenantSingleton: TenantScopedEntity {}
