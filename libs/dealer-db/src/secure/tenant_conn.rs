//! Tenant-bound connection: the scoped client every tenant-facing service uses.
//!
//! # Example
//!
//! ```ignore
//! use dealer_db::secure::TenantConn;
//!
//! pub struct VehiclesRepo {
//!     db: TenantConn,
//! }
//!
//! impl VehiclesRepo {
//!     pub async fn get(&self, id: Uuid) -> Result<Option<vehicle::Model>, ScopeError> {
//!         self.db.find_unique::<vehicle::Entity>(id).await
//!     }
//!
//!     pub async fn reprice(&self, id: Uuid, price_cents: i64) -> Result<vehicle::Model, ScopeError> {
//!         let am = vehicle::ActiveModel { price_cents: Set(price_cents), ..Default::default() };
//!         self.db.update::<vehicle::Entity>(id, am).await
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityName, FromQueryResult, IdenStatic, IntoActiveModel, Iterable,
    QueryFilter, QuerySelect, TransactionTrait, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::secure::cond::{key_condition, tenant_condition};
use crate::secure::{ScopeError, TenantId, TenantScopedEntity, TenantSelect, TenantSingleton};

/// Database connection bound to a single tenant.
///
/// Holds nothing but the tenant id and a handle to the shared pool; build one
/// per request with [`DbHandle::for_tenant`](crate::DbHandle::for_tenant) and
/// drop it when the request ends.
///
/// # Security Guarantees
///
/// - Reads and counts only ever see rows whose tenant column equals the bound tenant
/// - Point lookups report rows of other tenants as absent
/// - Inserts are stamped with the bound tenant regardless of the payload
/// - Updates and deletes verify ownership first and never rewrite the tenant column
/// - The raw connection is not exposed
///
/// Inside [`in_transaction`](TenantConn::in_transaction) the same operations
/// run on a `TenantConn<DatabaseTransaction>` bound to the same tenant.
#[derive(Clone, Debug)]
pub struct TenantConn<C = DatabaseConnection> {
    conn: C,
    tenant: TenantId,
}

/// Future returned by a [`TenantConn::in_transaction`] callback.
pub type TenantTxFuture<'c, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>;

impl TenantConn {
    #[must_use]
    pub fn new(conn: DatabaseConnection, tenant: TenantId) -> Self {
        Self { conn, tenant }
    }

    /// Run `f` in a database transaction confined to the bound tenant.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back otherwise.
    /// The callback only sees a tenant-bound connection, never the raw
    /// transaction.
    ///
    /// # Example
    /// ```ignore
    /// conn.in_transaction(move |tx| Box::pin(async move {
    ///     let flipped = tx.update_many::<vehicle::Entity>(not_sold, sold).await?;
    ///     if flipped == 0 {
    ///         return Err(DomainError::validation("vehicle_id", "already sold"));
    ///     }
    ///     Ok(tx.create::<sale::Entity>(sale).await?)
    /// }))
    /// .await
    /// ```
    ///
    /// # Errors
    /// Returns the callback's error, or `ScopeError::Db` (converted into `E`)
    /// if the transaction cannot be started or committed.
    pub async fn in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        T: Send,
        E: From<ScopeError> + Send,
        F: for<'c> FnOnce(&'c TenantConn<DatabaseTransaction>) -> TenantTxFuture<'c, T, E>
            + Send,
    {
        let txn = self.conn.begin().await.map_err(ScopeError::from)?;
        let scoped = TenantConn {
            conn: txn,
            tenant: self.tenant,
        };

        let outcome = f(&scoped).await;
        match outcome {
            Ok(value) => {
                scoped.conn.commit().await.map_err(ScopeError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = scoped.conn.rollback().await {
                    tracing::error!(tenant_id = %self.tenant, error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl<C> TenantConn<C>
where
    C: ConnectionTrait,
{
    #[inline]
    #[must_use]
    pub fn tenant(&self) -> TenantId {
        self.tenant
    }

    /// Start a tenant-scoped select for entity `E`.
    pub fn find<E>(&self) -> TenantSelect<'_, E, C>
    where
        E: TenantScopedEntity,
    {
        TenantSelect::new(&self.conn, self.tenant)
    }

    /// All rows of `E` matching `filter` within the bound tenant.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn find_many<E>(&self, filter: Condition) -> Result<Vec<E::Model>, ScopeError>
    where
        E: TenantScopedEntity,
    {
        tracing::debug!(tenant_id = %self.tenant, entity = %entity_name::<E>(), "find_many");
        self.find::<E>().filter(filter).all().await
    }

    /// First row of `E` matching `filter` within the bound tenant.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn find_first<E>(&self, filter: Condition) -> Result<Option<E::Model>, ScopeError>
    where
        E: TenantScopedEntity,
    {
        tracing::debug!(tenant_id = %self.tenant, entity = %entity_name::<E>(), "find_first");
        self.find::<E>().filter(filter).one().await
    }

    /// Number of rows of `E` matching `filter` within the bound tenant.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn count<E>(&self, filter: Condition) -> Result<u64, ScopeError>
    where
        E: TenantScopedEntity,
        E::Model: FromQueryResult + Send + Sync,
    {
        tracing::debug!(tenant_id = %self.tenant, entity = %entity_name::<E>(), "count");
        self.find::<E>().filter(filter).count().await
    }

    /// Look a row up by its globally unique key.
    ///
    /// A row owned by another tenant is reported exactly like a missing one.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn find_unique<E>(&self, id: Uuid) -> Result<Option<E::Model>, ScopeError>
    where
        E: TenantScopedEntity,
    {
        self.find_unique_by::<E>(key_condition::<E>(id)).await
    }

    /// Look a row up by any unique condition that does not include the tenant.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn find_unique_by<E>(&self, unique: Condition) -> Result<Option<E::Model>, ScopeError>
    where
        E: TenantScopedEntity,
    {
        let found = E::find().filter(unique).one(&self.conn).await?;
        Ok(found.filter(|model| {
            let owned = E::tenant_of(model) == self.tenant.as_uuid();
            if !owned {
                tracing::debug!(
                    tenant_id = %self.tenant,
                    entity = %entity_name::<E>(),
                    "point lookup hit a row outside the bound tenant"
                );
            }
            owned
        }))
    }

    /// Insert a row owned by the bound tenant.
    ///
    /// The tenant column is overwritten with the bound tenant; a missing key
    /// is filled with a fresh v4 UUID.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the insert fails.
    pub async fn create<E>(&self, mut am: E::ActiveModel) -> Result<E::Model, ScopeError>
    where
        E: TenantScopedEntity,
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        self.stamp::<E>(&mut am);
        tracing::debug!(tenant_id = %self.tenant, entity = %entity_name::<E>(), "create");
        Ok(am.insert(&self.conn).await?)
    }

    /// Update the row keyed by `id` if, and only if, the bound tenant owns it.
    ///
    /// The tenant column of `am` is ignored.
    ///
    /// # Errors
    /// - `ScopeError::NotFoundOrDenied` if the row is missing or owned by another tenant
    /// - `ScopeError::Db` if a database operation fails
    pub async fn update<E>(&self, id: Uuid, mut am: E::ActiveModel) -> Result<E::Model, ScopeError>
    where
        E: TenantScopedEntity,
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        self.ensure_owned::<E>(id, "update").await?;

        am.set(E::key_col(), id.into());
        am.not_set(E::tenant_col());

        tracing::debug!(tenant_id = %self.tenant, entity = %entity_name::<E>(), %id, "update");
        Ok(am.update(&self.conn).await?)
    }

    /// Delete the row keyed by `id` if, and only if, the bound tenant owns it.
    ///
    /// # Errors
    /// - `ScopeError::NotFoundOrDenied` if the row is missing or owned by another tenant
    /// - `ScopeError::Db` if a database operation fails
    pub async fn delete<E>(&self, id: Uuid) -> Result<(), ScopeError>
    where
        E: TenantScopedEntity,
    {
        self.ensure_owned::<E>(id, "delete").await?;

        let result = E::delete_many()
            .filter(key_condition::<E>(id))
            .filter(tenant_condition::<E>(self.tenant))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(ScopeError::NotFoundOrDenied {
                entity: entity_name::<E>(),
            });
        }

        tracing::debug!(tenant_id = %self.tenant, entity = %entity_name::<E>(), %id, "delete");
        Ok(())
    }

    /// Apply the columns set in `am` to every row of `E` in the bound tenant
    /// matching `filter`, returning how many rows changed.
    ///
    /// Key and tenant columns in `am` are ignored. A zero count lets callers
    /// build compare-and-set style transitions.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the update fails.
    pub async fn update_many<E>(
        &self,
        filter: Condition,
        mut am: E::ActiveModel,
    ) -> Result<u64, ScopeError>
    where
        E: TenantScopedEntity,
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    {
        am.not_set(E::key_col());
        am.not_set(E::tenant_col());

        let result = E::update_many()
            .set(am)
            .filter(tenant_condition::<E>(self.tenant))
            .filter(filter)
            .exec(&self.conn)
            .await?;

        tracing::debug!(
            tenant_id = %self.tenant,
            entity = %entity_name::<E>(),
            rows = result.rows_affected,
            "update_many"
        );
        Ok(result.rows_affected)
    }

    /// Create or update the bound tenant's single row of `E`.
    ///
    /// The tenant column is both stamped into the payload and used as the
    /// conflict target, so the statement can only ever touch this tenant's
    /// row. On conflict every column set in `am` other than the key and the
    /// tenant is overwritten.
    ///
    /// Any key in `am` is discarded; the tenant is the row's only identity
    /// here, so a key taken from another tenant's row changes nothing.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the statement or the follow-up read fails.
    pub async fn upsert<E>(&self, mut am: E::ActiveModel) -> Result<E::Model, ScopeError>
    where
        E: TenantSingleton,
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        am.not_set(E::key_col());
        self.stamp::<E>(&mut am);

        let key = E::key_col();
        let tenant_col = E::tenant_col();
        let update_cols: Vec<E::Column> = E::Column::iter()
            .filter(|col| col.as_str() != key.as_str() && col.as_str() != tenant_col.as_str())
            .filter(|col| !am.is_not_set(*col))
            .collect();

        let mut on_conflict = OnConflict::column(tenant_col);
        if update_cols.is_empty() {
            on_conflict.do_nothing();
        } else {
            on_conflict.update_columns(update_cols);
        }

        tracing::debug!(tenant_id = %self.tenant, entity = %entity_name::<E>(), "upsert");
        E::insert(am)
            .on_conflict(on_conflict)
            .exec_without_returning(&self.conn)
            .await?;

        self.find_first::<E>(Condition::all())
            .await?
            .ok_or_else(|| ScopeError::NotFoundOrDenied {
                entity: entity_name::<E>(),
            })
    }

    fn stamp<E>(&self, am: &mut E::ActiveModel)
    where
        E: TenantScopedEntity,
        E::ActiveModel: ActiveModelTrait<Entity = E>,
    {
        am.set(E::tenant_col(), self.tenant.as_uuid().into());
        if am.is_not_set(E::key_col()) {
            am.set(E::key_col(), Uuid::new_v4().into());
        }
    }

    /// Ownership pre-check: fetch only the tenant column of the target row.
    ///
    /// Runs outside any transaction with the mutation that follows; this is
    /// sound because a row's tenant never changes after insert.
    async fn ensure_owned<E>(&self, id: Uuid, op: &'static str) -> Result<(), ScopeError>
    where
        E: TenantScopedEntity,
    {
        let owner: Option<Uuid> = E::find()
            .select_only()
            .column(E::tenant_col())
            .filter(E::key_col().eq(id))
            .into_tuple()
            .one(&self.conn)
            .await?;

        if owner == Some(self.tenant.as_uuid()) {
            return Ok(());
        }

        tracing::warn!(
            tenant_id = %self.tenant,
            entity = %entity_name::<E>(),
            %id,
            op,
            "mutation rejected: row not found or owned by another tenant"
        );
        Err(ScopeError::NotFoundOrDenied {
            entity: entity_name::<E>(),
        })
    }
}

fn entity_name<E: EntityName>() -> String {
    E::default().table_name().to_owned()
}
