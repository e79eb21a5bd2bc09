use async_trait::async_trait;
use dealer_db::secure::GlobalConn;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repo::TenantDirectory;

use super::entity::tenant;

pub struct SeaOrmTenantDirectory {
    db: GlobalConn,
}

impl SeaOrmTenantDirectory {
    #[must_use]
    pub fn new(db: GlobalConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TenantDirectory for SeaOrmTenantDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<tenant::Model>, DomainError> {
        Ok(self.db.find_by_id::<tenant::Entity>(id).await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<tenant::Model>, DomainError> {
        Ok(tenant::Entity::find()
            .filter(tenant::Column::Slug.eq(slug))
            .one(self.db.conn())
            .await?)
    }
}
