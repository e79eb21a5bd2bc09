#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code, clippy::must_use_candidate, clippy::missing_panics_doc)]

use std::sync::Arc;

use dealer_db::secure::TenantId;
use dealer_db::{ConnectOpts, DbHandle};
use dealership::config::PlanQuotas;
use dealership::infra::storage::SeaOrmTenantDirectory;
use dealership::infra::storage::entity::tenant::{self, Plan, TenantStatus};
use dealership::{DealershipService, PlatformAdmin};

pub struct TestEnv {
    pub db: DbHandle,
    pub admin: PlatformAdmin,
}

/// Migrated in-memory database.
pub async fn setup() -> TestEnv {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("connect sqlite");
    dealership::migrate(&db).await.expect("migrate");
    let admin = PlatformAdmin::new(db.global(), PlanQuotas::default());
    TestEnv { db, admin }
}

impl TestEnv {
    /// Provision and approve a tenant.
    pub async fn active_tenant(&self, slug: &str, plan: Plan) -> tenant::Model {
        let created = self
            .admin
            .provision(slug, &format!("{slug} motors"), plan)
            .await
            .unwrap();
        self.admin
            .set_status(TenantId::new(created.id).unwrap(), TenantStatus::Active)
            .await
            .unwrap()
    }

    pub fn service(&self, tenant: &tenant::Model) -> DealershipService {
        DealershipService::new(
            &self.db,
            TenantId::new(tenant.id).unwrap(),
            Arc::new(SeaOrmTenantDirectory::new(self.db.global())),
        )
    }
}
