#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code, clippy::must_use_candidate, clippy::missing_panics_doc)]

use dealer_db::secure::TenantId;
use dealer_db::{ConnectOpts, DbConnTrait, DbHandle};
use uuid::Uuid;

pub mod widget {
    use dealer_db::secure::TenantScoped;
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, TenantScoped)]
    #[sea_orm(table_name = "widgets")]
    #[scoped(tenant_col = "tenant_id", key_col = "id")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub brand: String,
        pub price: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod settings {
    use dealer_db::secure::TenantScoped;
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, TenantScoped)]
    #[sea_orm(table_name = "settings")]
    #[scoped(tenant_col = "tenant_id", key_col = "id", singleton)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub currency: String,
        pub locale: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Fresh in-memory database with the `widgets` and `settings` tables.
pub async fn setup() -> DbHandle {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("connect sqlite");

    let global = db.global();
    for ddl in [
        "CREATE TABLE widgets (
            id BLOB PRIMARY KEY NOT NULL,
            tenant_id BLOB NOT NULL,
            brand TEXT NOT NULL,
            price INTEGER NOT NULL
        )",
        "CREATE TABLE settings (
            id BLOB PRIMARY KEY NOT NULL,
            tenant_id BLOB NOT NULL UNIQUE,
            currency TEXT NOT NULL,
            locale TEXT NOT NULL
        )",
    ] {
        global
            .conn()
            .execute_unprepared(ddl)
            .await
            .expect("create table");
    }

    db
}

pub fn new_tenant() -> TenantId {
    TenantId::new(Uuid::new_v4()).unwrap()
}
