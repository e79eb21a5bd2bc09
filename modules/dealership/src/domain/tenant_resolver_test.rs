#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::super::*;
    use crate::config::DealershipConfig;
    use crate::infra::storage::entity::tenant::{self, Plan, TenantStatus};
    use async_trait::async_trait;
    use http::{HeaderMap, HeaderValue};
    use std::sync::Arc;
    use uuid::Uuid;

    // In-memory tenant registry
    struct MockDirectory {
        tenants: Vec<tenant::Model>,
    }

    #[async_trait]
    impl repo::TenantDirectory for MockDirectory {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<tenant::Model>, error::DomainError> {
            Ok(self.tenants.iter().find(|t| t.id == id).cloned())
        }

        async fn find_by_slug(
            &self,
            slug: &str,
        ) -> Result<Option<tenant::Model>, error::DomainError> {
            Ok(self.tenants.iter().find(|t| t.slug == slug).cloned())
        }
    }

    fn tenant(slug: &str, status: TenantStatus) -> tenant::Model {
        tenant::Model {
            id: Uuid::new_v4(),
            slug: slug.to_owned(),
            name: slug.to_uppercase(),
            status,
            plan: Plan::Basic,
            max_users: 3,
            max_vehicles: 50,
            created_at: chrono::Utc::now(),
        }
    }

    fn resolver(tenants: Vec<tenant::Model>) -> tenant_resolver::TenantResolver {
        let cfg = DealershipConfig {
            base_domain: "dealers.example".to_owned(),
            ..Default::default()
        };
        tenant_resolver::TenantResolver::new(Arc::new(MockDirectory { tenants }), &cfg)
    }

    fn host(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::HOST, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_slug_from_host() {
        let r = resolver(vec![]);
        assert_eq!(r.slug_from_host("acme.dealers.example").as_deref(), Some("acme"));
        assert_eq!(r.slug_from_host("ACME.dealers.example:8443").as_deref(), Some("acme"));
        assert_eq!(r.slug_from_host("dealers.example"), None);
        assert_eq!(r.slug_from_host("www.dealers.example"), None);
        assert_eq!(r.slug_from_host("a.b.dealers.example"), None);
        assert_eq!(r.slug_from_host("acme.other.example"), None);
    }

    #[tokio::test]
    async fn test_resolve_active_tenant_by_host() {
        let acme = tenant("acme", TenantStatus::Active);
        let r = resolver(vec![acme.clone()]);

        let id = r.resolve(&host("acme.dealers.example")).await.unwrap();
        assert_eq!(id.as_uuid(), acme.id);
    }

    #[tokio::test]
    async fn test_header_takes_precedence_over_host() {
        let acme = tenant("acme", TenantStatus::Active);
        let globex = tenant("globex", TenantStatus::Active);
        let r = resolver(vec![acme.clone(), globex.clone()]);

        let mut headers = host("acme.dealers.example");
        headers.insert(
            "x-tenant-id",
            HeaderValue::from_str(&globex.id.to_string()).unwrap(),
        );
        assert_eq!(r.resolve(&headers).await.unwrap().as_uuid(), globex.id);
    }

    #[tokio::test]
    async fn test_inactive_and_unknown_tenants_are_unavailable() {
        let r = resolver(vec![
            tenant("pending", TenantStatus::Pending),
            tenant("suspended", TenantStatus::Suspended),
            tenant("cancelled", TenantStatus::Cancelled),
        ]);

        for slug in ["pending", "suspended", "cancelled", "missing"] {
            let err = r
                .resolve(&host(&format!("{slug}.dealers.example")))
                .await
                .unwrap_err();
            assert!(matches!(err, error::DomainError::TenantUnavailable), "{slug}");
        }
    }

    #[tokio::test]
    async fn test_malformed_header_is_unavailable() {
        let r = resolver(vec![tenant("acme", TenantStatus::Active)]);
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant-id", HeaderValue::from_static("acme"));
        assert!(matches!(
            r.resolve(&headers).await,
            Err(error::DomainError::TenantUnavailable)
        ));
        assert!(matches!(
            r.resolve(&HeaderMap::new()).await,
            Err(error::DomainError::TenantUnavailable)
        ));
    }
}
