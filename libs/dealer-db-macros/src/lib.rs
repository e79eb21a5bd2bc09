// Proc-macro crate for dealer-db tenant-scoped derives
//
//! # dealer-db-macros
//!
//! Procedural macros for the `dealer-db` tenant-scoped data access layer.
//!
//! ## `#[derive(TenantScoped)]`
//!
//! Implements `TenantScopedEntity` (and optionally `TenantSingleton`) for a
//! `SeaORM` entity, based on the `#[scoped(...)]` attribute on its `Model`.
//!
//! ### Example
//!
//! ```ignore
//! use sea_orm::entity::prelude::*;
//! use dealer_db::secure::TenantScoped;
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
//! ```
//!
//! ### Attributes
//!
//! - `tenant_col = "column_name"` (required): the tenant foreign key column
//! - `key_col = "column_name"` (required): the globally unique key column
//! - `singleton`: at most one row per tenant; enables `upsert`

use proc_macro::TokenStream;
use proc_macro_error2::{abort, proc_macro_error};
use syn::{DeriveInput, parse_macro_input};

mod scoped;

/// Derive macro for implementing `TenantScopedEntity`.
///
/// Place this on your `SeaORM` `Model` struct along with a `#[scoped(...)]` attribute.
///
/// Both `tenant_col` and `key_col` must name fields of the struct; the tenant
/// field is read back by the generated `tenant_of` accessor, so it must be a
/// plain `Uuid`.
///
/// # Singleton entities
///
/// ```ignore
/// #[derive(DeriveEntityModel, TenantScoped)]
/// #[sea_orm(table_name = "app_config")]
/// #[scoped(tenant_col = "tenant_id", key_col = "id", singleton)]
/// pub struct Model {
///     #[sea_orm(primary_key, auto_increment = false)]
///     pub id: Uuid,
///     #[sea_orm(unique)]
///     pub tenant_id: Uuid,
///     pub currency: String,
/// }
/// ```
#[proc_macro_derive(TenantScoped, attributes(scoped))]
#[proc_macro_error]
pub fn derive_tenant_scoped(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match scoped::expand_derive_tenant_scoped(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => abort!(err.span(), "{}", err),
    }
}
