use dealer_db::secure::TenantScoped;
use sea_orm::entity::prelude::*;

/// Per-tenant dealership settings. At most one row per tenant.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, TenantScoped)]
#[sea_orm(table_name = "app_configs")]
#[scoped(tenant_col = "tenant_id", key_col = "id", singleton)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub tenant_id: Uuid,
    pub dealership_name: String,
    pub currency: String,
    pub locale: String,
    pub primary_color: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
