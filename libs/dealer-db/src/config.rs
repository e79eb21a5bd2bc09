//! Database configuration.
//!
//! Layering (later wins): built-in defaults, optional YAML file, then
//! `DEALER_DB__*` environment variables (`__` separates nested keys, e.g.
//! `DEALER_DB__POOL__MAX_CONNS=20`).

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::{ConnectOpts, DbError, Result};

/// Environment prefix for database settings.
pub const ENV_PREFIX: &str = "DEALER_DB__";

/// Top-level database configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    /// Connection string; may reference environment variables as `${VAR}`.
    pub dsn: String,
    pub pool: PoolCfg,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite::memory:".to_owned(),
            pool: PoolCfg::default(),
        }
    }
}

/// Pool tuning knobs. Durations use humantime syntax (`"30s"`, `"5m"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolCfg {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub max_lifetime: Option<Duration>,
    pub test_before_acquire: bool,
}

impl Default for PoolCfg {
    fn default() -> Self {
        let opts = ConnectOpts::default();
        Self {
            max_conns: opts.max_conns,
            min_conns: opts.min_conns,
            acquire_timeout: opts.acquire_timeout,
            idle_timeout: opts.idle_timeout,
            max_lifetime: opts.max_lifetime,
            test_before_acquire: opts.test_before_acquire,
        }
    }
}

impl From<&PoolCfg> for ConnectOpts {
    fn from(cfg: &PoolCfg) -> Self {
        Self {
            max_conns: cfg.max_conns,
            min_conns: cfg.min_conns,
            acquire_timeout: cfg.acquire_timeout,
            idle_timeout: cfg.idle_timeout,
            max_lifetime: cfg.max_lifetime,
            test_before_acquire: cfg.test_before_acquire,
        }
    }
}

impl DbConfig {
    /// Build the default figment: defaults, then the YAML file (if any), then env.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract the configuration from an arbitrary figment.
    ///
    /// # Errors
    /// Returns `DbError::InvalidConfig` if extraction fails or the result is invalid.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let cfg: Self = figment
            .extract()
            .map_err(|e| DbError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load using the standard layering.
    ///
    /// # Errors
    /// Returns `DbError::InvalidConfig` if the configuration cannot be read or is invalid.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let figment = Self::figment(path.as_ref().map(AsRef::as_ref));
        Self::from_figment(&figment)
    }

    /// Check for values that cannot possibly produce a working pool.
    ///
    /// # Errors
    /// Returns `DbError::InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.dsn.trim().is_empty() {
            return Err(DbError::InvalidConfig("dsn must not be empty".to_owned()));
        }
        if let (Some(min), Some(max)) = (self.pool.min_conns, self.pool.max_conns)
            && min > max
        {
            return Err(DbError::InvalidConfig(format!(
                "pool.min_conns ({min}) exceeds pool.max_conns ({max})"
            )));
        }
        if self.pool.max_conns == Some(0) {
            return Err(DbError::InvalidConfig(
                "pool.max_conns must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }

    /// DSN with `${VAR}` references expanded.
    ///
    /// # Errors
    /// Returns `DbError::EnvVar` if a referenced variable is not set.
    pub fn resolved_dsn(&self) -> Result<String> {
        expand_env_vars(&self.dsn)
    }
}

fn expand_env_vars(input: &str) -> Result<String> {
    let re = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| DbError::InvalidParameter(e.to_string()))?;
    let mut result = input.to_owned();

    for caps in re.captures_iter(input) {
        let full_match = &caps[0];
        let var_name = &caps[1];
        let value = std::env::var(var_name)?;
        result = result.replace(full_match, &value);
    }

    Ok(result)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_valid() {
        let cfg = DbConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.pool.max_conns, Some(10));
    }

    #[test]
    fn yaml_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "db.yaml",
                r#"
dsn: "postgres://app:${DB_PASSWORD}@db:5432/dealers"
pool:
  max_conns: 5
  acquire_timeout: "2s"
"#,
            )?;
            jail.set_env("DEALER_DB__POOL__MIN_CONNS", "2");
            jail.set_env("DB_PASSWORD", "hunter2");

            let cfg = DbConfig::load(Some("db.yaml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.pool.max_conns, Some(5));
            assert_eq!(cfg.pool.min_conns, Some(2));
            assert_eq!(cfg.pool.acquire_timeout, Some(Duration::from_secs(2)));
            assert_eq!(
                cfg.resolved_dsn().map_err(|e| e.to_string())?,
                "postgres://app:hunter2@db:5432/dealers"
            );
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("db.yaml", "dsn: \"sqlite::memory:\"\nbogus: 1\n")?;
            let err = DbConfig::load(Some("db.yaml")).unwrap_err();
            assert!(matches!(err, DbError::InvalidConfig(_)));
            Ok(())
        });
    }

    #[test]
    fn min_above_max_is_rejected() {
        let cfg = DbConfig {
            pool: PoolCfg {
                min_conns: Some(8),
                max_conns: Some(4),
                ..PoolCfg::default()
            },
            ..DbConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(DbError::InvalidConfig(_))));
    }

    #[test]
    fn missing_env_var_in_dsn_fails() {
        let cfg = DbConfig {
            dsn: "postgres://app:${DEALER_DB_TEST_SURELY_UNSET_VAR}@db/x".to_owned(),
            ..DbConfig::default()
        };
        assert!(matches!(cfg.resolved_dsn(), Err(DbError::EnvVar(_))));
    }
}
