use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, sea_query::IntoCondition,
};

use crate::secure::cond::tenant_condition;
use crate::secure::{ScopeError, TenantId, TenantScopedEntity};

/// A select over a tenant-scoped entity with the tenant filter already applied.
///
/// Only [`TenantConn::find`](super::TenantConn::find) creates one. The inner
/// `SeaORM` `Select` is never handed out, so builder methods can narrow the
/// query but cannot drop the tenant predicate.
///
/// # Example
/// ```rust,ignore
/// let latest = conn
///     .find::<vehicle::Entity>()
///     .filter(vehicle::Column::Status.eq("available"))
///     .order_by_desc(vehicle::Column::CreatedAt)
///     .limit(20)
///     .all()
///     .await?;
/// ```
#[must_use]
#[derive(Clone, Debug)]
pub struct TenantSelect<'a, E: EntityTrait, C = DatabaseConnection> {
    inner: Select<E>,
    conn: &'a C,
    tenant: TenantId,
}

impl<'a, E, C> TenantSelect<'a, E, C>
where
    E: TenantScopedEntity,
    C: ConnectionTrait,
{
    pub(crate) fn new(conn: &'a C, tenant: TenantId) -> Self {
        Self {
            inner: E::find().filter(tenant_condition::<E>(tenant)),
            conn,
            tenant,
        }
    }

    /// Tenant the query is confined to.
    #[must_use]
    pub fn tenant(&self) -> TenantId {
        self.tenant
    }

    /// AND an additional condition into the query.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: IntoCondition,
    {
        self.inner = QueryFilter::filter(self.inner, filter);
        self
    }

    pub fn order_by_asc(mut self, col: E::Column) -> Self {
        self.inner = QueryOrder::order_by(self.inner, col, Order::Asc);
        self
    }

    pub fn order_by_desc(mut self, col: E::Column) -> Self {
        self.inner = QueryOrder::order_by(self.inner, col, Order::Desc);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.inner = QuerySelect::limit(self.inner, limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.inner = QuerySelect::offset(self.inner, offset);
        self
    }

    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn all(self) -> Result<Vec<E::Model>, ScopeError> {
        Ok(self.inner.all(self.conn).await?)
    }

    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn one(self) -> Result<Option<E::Model>, ScopeError> {
        Ok(self.inner.one(self.conn).await?)
    }

    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn count(self) -> Result<u64, ScopeError>
    where
        E::Model: FromQueryResult + Send + Sync,
    {
        Ok(self.inner.count(self.conn).await?)
    }
}
