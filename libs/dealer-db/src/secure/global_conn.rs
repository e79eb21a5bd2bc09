use sea_orm::{DatabaseConnection, EntityTrait, PrimaryKeyTrait};
use uuid::Uuid;

use crate::secure::{ScopeError, TenantConn, TenantId};

/// Unscoped database access for platform-level code.
///
/// Tenant resolution, tenant provisioning and cross-tenant administration
/// run here. Queries issued through [`GlobalConn::conn`] see every tenant's
/// rows, so it must never be handed to request handlers serving a single
/// tenant; give those a [`TenantConn`] instead.
#[derive(Clone, Debug)]
pub struct GlobalConn {
    conn: DatabaseConnection,
}

impl GlobalConn {
    pub(crate) fn new(conn: DatabaseConnection) -> Self {
        tracing::info!(target: "dealer_db::global", "unscoped database access acquired");
        Self { conn }
    }

    /// Raw `SeaORM` connection with no tenant filtering.
    #[must_use]
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Fetch any row by its primary key, whichever tenant owns it.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn find_by_id<E>(&self, id: Uuid) -> Result<Option<E::Model>, ScopeError>
    where
        E: EntityTrait,
        <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
    {
        Ok(E::find_by_id(id).one(&self.conn).await?)
    }

    /// Narrow to a single tenant once platform code has picked one.
    #[must_use]
    pub fn for_tenant(&self, tenant: TenantId) -> TenantConn {
        TenantConn::new(self.conn.clone(), tenant)
    }
}
