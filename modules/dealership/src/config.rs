//! Configuration for the dealership module.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::infra::storage::entity::tenant::Plan;

/// Environment prefix for dealership settings (e.g. `DEALERSHIP__BASE_DOMAIN`).
pub const ENV_PREFIX: &str = "DEALERSHIP__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DealershipConfig {
    /// Apex domain tenants are served under; `acme.dealers.example` resolves
    /// the `acme` tenant when this is `dealers.example`.
    pub base_domain: String,

    /// Request header carrying an explicit tenant id. Takes precedence over the host.
    pub tenant_header: String,

    /// Quotas a tenant receives when provisioned on each plan.
    pub plans: PlanQuotas,
}

impl Default for DealershipConfig {
    fn default() -> Self {
        Self {
            base_domain: "localhost".to_owned(),
            tenant_header: "x-tenant-id".to_owned(),
            plans: PlanQuotas::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PlanQuotas {
    pub basic: Quota,
    pub pro: Quota,
    pub enterprise: Quota,
}

impl Default for PlanQuotas {
    fn default() -> Self {
        Self {
            basic: Quota {
                max_users: 3,
                max_vehicles: 50,
            },
            pro: Quota {
                max_users: 15,
                max_vehicles: 500,
            },
            enterprise: Quota {
                max_users: 100,
                max_vehicles: 10_000,
            },
        }
    }
}

impl PlanQuotas {
    #[must_use]
    pub fn for_plan(&self, plan: Plan) -> Quota {
        match plan {
            Plan::Basic => self.basic,
            Plan::Pro => self.pro,
            Plan::Enterprise => self.enterprise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Quota {
    pub max_users: i32,
    pub max_vehicles: i32,
}

impl DealershipConfig {
    /// Defaults, then the YAML file (if any), then `DEALERSHIP__*` env vars.
    ///
    /// # Errors
    /// Returns the figment error if a source cannot be read or a value has the wrong shape.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }
}
