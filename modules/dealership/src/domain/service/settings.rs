use chrono::Utc;
use sea_orm::{Condition, NotSet, Set};

use super::{DealershipService, require_non_empty};
use crate::domain::error::DomainError;
use crate::domain::models::AppConfigInput;
use crate::infra::storage::entity::app_config;

impl DealershipService {
    /// The tenant's settings, if it has saved any.
    ///
    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn app_config(&self) -> Result<Option<app_config::Model>, DomainError> {
        Ok(self
            .db
            .find_first::<app_config::Entity>(Condition::all())
            .await?)
    }

    /// Create or replace the tenant's settings.
    ///
    /// # Errors
    /// Returns `DomainError::Validation` for malformed input.
    pub async fn save_app_config(
        &self,
        input: AppConfigInput,
    ) -> Result<app_config::Model, DomainError> {
        let dealership_name = require_non_empty("dealership_name", &input.dealership_name)?;
        let currency = input.currency.trim().to_uppercase();
        if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(DomainError::validation(
                "currency",
                "must be a three-letter ISO 4217 code",
            ));
        }
        let locale = require_non_empty("locale", &input.locale)?;
        if let Some(color) = &input.primary_color
            && !is_hex_color(color)
        {
            return Err(DomainError::validation("primary_color", "must look like #1a2b3c"));
        }

        let am = app_config::ActiveModel {
            id: NotSet,
            tenant_id: NotSet,
            dealership_name: Set(dealership_name),
            currency: Set(currency),
            locale: Set(locale),
            primary_color: Set(input.primary_color),
            updated_at: Set(Utc::now()),
        };
        Ok(self.db.upsert::<app_config::Entity>(am).await?)
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}
