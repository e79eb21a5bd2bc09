//! Tenant-scoped data access layer.
//!
//! Every tenant-facing code path talks to the database through a
//! [`TenantConn`], built per request by [`DbHandle::for_tenant`]. The
//! connection binds exactly one [`TenantId`] and applies the isolation rules
//! below to every operation on a [`TenantScopedEntity`], so call sites never
//! have to remember a tenant filter.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dealer_db::secure::{TenantId, TenantScoped};
//! use sea_orm::{entity::prelude::*, Condition, Set};
//!
//! #[derive(Clone, Debug, PartialEq, DeriveEntityModel, TenantScoped)]
//! #[sea_orm(table_name = "vehicles")]
//! #[scoped(tenant_col = "tenant_id", key_col = "id")]
//! pub struct Model {
//!     #[sea_orm(primary_key, auto_increment = false)]
//!     pub id: Uuid,
//!     pub tenant_id: Uuid,
//!     pub brand: String,
//! }
//!
//! let conn = db.for_tenant(tenant_id);
//! let created = conn
//!     .create::<Entity>(ActiveModel { brand: Set("Toyota".into()), ..Default::default() })
//!     .await?;
//! let toyotas = conn
//!     .find_many::<Entity>(Condition::all().add(Column::Brand.eq("Toyota")))
//!     .await?;
//! ```
//!
//! # Policy
//!
//! | Operation | Behavior |
//! |-----------|----------|
//! | `find` / `find_many` / `find_first` / `count` | caller filter AND `tenant_col = T` |
//! | `find_unique` | unscoped key lookup, foreign rows reported as `None` |
//! | `create` | `tenant_col` overwritten with `T` |
//! | `update` / `delete` | ownership pre-check, else `NotFoundOrDenied` |
//! | `update_many` | caller filter AND `tenant_col = T`; key and tenant never written |
//! | `upsert` (singletons) | `tenant_col = T` in payload and conflict target, key always fresh |
//!
//! [`TenantConn::in_transaction`] runs a callback against a
//! `TenantConn<DatabaseTransaction>` carrying the same tenant and rules.
//!
//! The unscoped [`GlobalConn`] (via [`DbHandle::global`]) bypasses all of
//! this and is reserved for platform administration.
//!
//! [`DbHandle::for_tenant`]: crate::DbHandle::for_tenant
//! [`DbHandle::global`]: crate::DbHandle::global

mod cond;
mod entity_traits;
mod error;
mod global_conn;
mod select;
mod tenant;
mod tenant_conn;

pub use cond::{key_condition, tenant_condition};
pub use entity_traits::{TenantScopedEntity, TenantSingleton};
pub use error::ScopeError;
pub use global_conn::GlobalConn;
pub use select::TenantSelect;
pub use tenant::TenantId;
pub use tenant_conn::{TenantConn, TenantTxFuture};

pub use dealer_db_macros::TenantScoped;
