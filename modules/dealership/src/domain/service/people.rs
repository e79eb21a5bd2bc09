use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, NotSet, Set};
use uuid::Uuid;

use super::{DealershipService, require_non_empty, unique_or};
use crate::domain::error::DomainError;
use crate::domain::models::{NewClient, NewUser};
use crate::infra::storage::entity::{client, user};

impl DealershipService {
    /// Add a staff account, subject to the tenant's user quota.
    ///
    /// # Errors
    /// - `DomainError::Validation` for malformed input or an email already used in this tenant
    /// - `DomainError::QuotaExceeded` when `max_users` is reached
    pub async fn create_user(&self, input: NewUser) -> Result<user::Model, DomainError> {
        let email = normalize_email(&input.email)?;
        let full_name = require_non_empty("full_name", &input.full_name)?;
        let role = require_non_empty("role", &input.role)?;

        let duplicate = self
            .db
            .find_first::<user::Entity>(Condition::all().add(user::Column::Email.eq(email.as_str())))
            .await?;
        if duplicate.is_some() {
            return Err(DomainError::validation("email", "already registered"));
        }

        let tenant = self.tenant_record().await?;
        self.ensure_quota::<user::Entity>("users", tenant.max_users)
            .await?;

        let am = user::ActiveModel {
            id: NotSet,
            tenant_id: NotSet,
            email: Set(email),
            full_name: Set(full_name),
            role: Set(role),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        };
        self.db
            .create::<user::Entity>(am)
            .await
            .map_err(|e| unique_or("email", "already registered", e))
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn list_users(&self) -> Result<Vec<user::Model>, DomainError> {
        Ok(self
            .db
            .find::<user::Entity>()
            .order_by_asc(user::Column::FullName)
            .all()
            .await?)
    }

    /// # Errors
    /// Returns `DomainError::NotFound` if the user does not exist for this tenant.
    pub async fn deactivate_user(&self, id: Uuid) -> Result<user::Model, DomainError> {
        let am = user::ActiveModel {
            is_active: Set(false),
            ..Default::default()
        };
        self.db
            .update::<user::Entity>(id, am)
            .await
            .map_err(|e| DomainError::from_scope("User", e))
    }

    /// # Errors
    /// Returns `DomainError::Validation` if the name is empty.
    pub async fn create_client(&self, input: NewClient) -> Result<client::Model, DomainError> {
        let full_name = require_non_empty("full_name", &input.full_name)?;
        let email = input.email.as_deref().map(normalize_email).transpose()?;

        let am = client::ActiveModel {
            id: NotSet,
            tenant_id: NotSet,
            full_name: Set(full_name),
            email: Set(email),
            phone: Set(input.phone.filter(|p| !p.trim().is_empty())),
            created_at: Set(Utc::now()),
        };
        Ok(self.db.create::<client::Entity>(am).await?)
    }

    /// # Errors
    /// Returns `DomainError::NotFound` if the client does not exist for this tenant.
    pub async fn get_client(&self, id: Uuid) -> Result<client::Model, DomainError> {
        self.db
            .find_unique::<client::Entity>(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Client"))
    }

    /// Clients whose name contains `term`, newest first.
    ///
    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn search_clients(&self, term: &str) -> Result<Vec<client::Model>, DomainError> {
        let mut select = self.db.find::<client::Entity>();
        let term = term.trim();
        if !term.is_empty() {
            select = select.filter(client::Column::FullName.contains(term));
        }
        Ok(select
            .order_by_desc(client::Column::CreatedAt)
            .all()
            .await?)
    }
}

fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(DomainError::validation("email", "invalid email address"));
    }
    Ok(email)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email(" Ana@Dealer.COM ").unwrap(), "ana@dealer.com");
        assert!(normalize_email("ana").is_err());
        assert!(normalize_email("@dealer.com").is_err());
        assert!(normalize_email("ana@localhost").is_err());
    }
}
