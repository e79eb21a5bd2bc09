use dealer_db::secure::TenantScoped;
use sea_orm::entity::prelude::*;

/// A unit of dealership inventory. Prices are stored in minor currency units.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, TenantScoped)]
#[sea_orm(table_name = "vehicles")]
#[scoped(tenant_col = "tenant_id", key_col = "id")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub vin: Option<String>,
    pub price_cents: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
