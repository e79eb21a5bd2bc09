//! Maps an inbound request to the tenant it is served for.
//!
//! An explicit tenant header wins; otherwise the left-most label of the
//! `Host` under the configured base domain is taken as the tenant slug.
//! Only `active` tenants resolve. Everything else, including unknown
//! tenants, comes back as [`DomainError::TenantUnavailable`].

use std::sync::Arc;

use dealer_db::secure::TenantId;
use http::HeaderMap;
use http::header::HOST;

use super::error::DomainError;
use super::repo::TenantDirectory;
use crate::config::DealershipConfig;
use crate::infra::storage::entity::tenant::{self, TenantStatus};

pub struct TenantResolver {
    directory: Arc<dyn TenantDirectory>,
    base_domain: String,
    tenant_header: String,
}

impl TenantResolver {
    #[must_use]
    pub fn new(directory: Arc<dyn TenantDirectory>, cfg: &DealershipConfig) -> Self {
        Self {
            directory,
            base_domain: cfg.base_domain.trim_matches('.').to_ascii_lowercase(),
            tenant_header: cfg.tenant_header.to_ascii_lowercase(),
        }
    }

    /// Resolve the tenant for a request from its headers.
    ///
    /// # Errors
    /// - `DomainError::TenantUnavailable` if no tenant can be derived, or it is not active
    /// - `DomainError::Database` if the registry lookup fails
    pub async fn resolve(&self, headers: &HeaderMap) -> Result<TenantId, DomainError> {
        if let Some(value) = headers.get(self.tenant_header.as_str()) {
            let raw = value.to_str().map_err(|_| DomainError::TenantUnavailable)?;
            let id = TenantId::parse(raw).map_err(|_| DomainError::TenantUnavailable)?;
            return self.resolve_id(id).await;
        }

        let host = headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .ok_or(DomainError::TenantUnavailable)?;
        let slug = self
            .slug_from_host(host)
            .ok_or(DomainError::TenantUnavailable)?;
        self.resolve_slug(&slug).await
    }

    /// # Errors
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_id(&self, id: TenantId) -> Result<TenantId, DomainError> {
        let found = self.directory.find_by_id(id.as_uuid()).await?;
        Self::ensure_active(found)
    }

    /// # Errors
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_slug(&self, slug: &str) -> Result<TenantId, DomainError> {
        let found = self.directory.find_by_slug(slug).await?;
        Self::ensure_active(found)
    }

    /// `acme.dealers.example:8080` -> `acme` for base domain `dealers.example`.
    ///
    /// The apex itself, `www`, and nested subdomains yield `None`.
    #[must_use]
    pub fn slug_from_host(&self, host: &str) -> Option<String> {
        let host = host.split(':').next()?.trim_end_matches('.').to_ascii_lowercase();
        let suffix = format!(".{}", self.base_domain);
        let label = host.strip_suffix(&suffix)?;
        if label.is_empty() || label == "www" || label.contains('.') {
            return None;
        }
        Some(label.to_owned())
    }

    fn ensure_active(found: Option<tenant::Model>) -> Result<TenantId, DomainError> {
        let Some(tenant) = found else {
            tracing::debug!("tenant resolution failed: no such tenant");
            return Err(DomainError::TenantUnavailable);
        };
        if tenant.status != TenantStatus::Active {
            tracing::info!(
                tenant_id = %tenant.id,
                status = ?tenant.status,
                "refusing to serve inactive tenant"
            );
            return Err(DomainError::TenantUnavailable);
        }
        TenantId::new(tenant.id).map_err(|_| DomainError::TenantUnavailable)
    }
}
