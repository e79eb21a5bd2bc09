//! Tenant-defined reference data: document templates, payment methods and
//! extra vehicle form fields.

use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, NotSet, Set};
use uuid::Uuid;

use super::{DealershipService, require_non_empty, unique_or};
use crate::domain::error::DomainError;
use crate::domain::models::{NewDocumentTemplate, NewPropertyField};
use crate::infra::storage::entity::{document_template, payment_method, vehicle_property_field};

const FIELD_TYPES: &[&str] = &["text", "number", "boolean", "date"];

impl DealershipService {
    /// # Errors
    /// Returns `DomainError::Validation` if a required field is empty.
    pub async fn create_document_template(
        &self,
        input: NewDocumentTemplate,
    ) -> Result<document_template::Model, DomainError> {
        let am = document_template::ActiveModel {
            id: NotSet,
            tenant_id: NotSet,
            name: Set(require_non_empty("name", &input.name)?),
            kind: Set(require_non_empty("kind", &input.kind)?),
            body: Set(input.body),
            updated_at: Set(Utc::now()),
        };
        Ok(self.db.create::<document_template::Entity>(am).await?)
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn list_document_templates(
        &self,
        kind: Option<&str>,
    ) -> Result<Vec<document_template::Model>, DomainError> {
        let mut cond = Condition::all();
        if let Some(kind) = kind {
            cond = cond.add(document_template::Column::Kind.eq(kind));
        }
        Ok(self
            .db
            .find::<document_template::Entity>()
            .filter(cond)
            .order_by_asc(document_template::Column::Name)
            .all()
            .await?)
    }

    /// # Errors
    /// Returns `DomainError::NotFound` if the template does not exist for this tenant.
    pub async fn update_document_template_body(
        &self,
        id: Uuid,
        body: String,
    ) -> Result<document_template::Model, DomainError> {
        let am = document_template::ActiveModel {
            body: Set(body),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        self.db
            .update::<document_template::Entity>(id, am)
            .await
            .map_err(|e| DomainError::from_scope("Document template", e))
    }

    /// # Errors
    /// Returns `DomainError::NotFound` if the template does not exist for this tenant.
    pub async fn delete_document_template(&self, id: Uuid) -> Result<(), DomainError> {
        self.db
            .delete::<document_template::Entity>(id)
            .await
            .map_err(|e| DomainError::from_scope("Document template", e))
    }

    /// # Errors
    /// Returns `DomainError::Validation` if the name is empty or already used.
    pub async fn add_payment_method(&self, name: &str) -> Result<payment_method::Model, DomainError> {
        let name = require_non_empty("name", name)?;
        let exists = self
            .db
            .count::<payment_method::Entity>(
                Condition::all().add(payment_method::Column::Name.eq(name.as_str())),
            )
            .await?;
        if exists > 0 {
            return Err(DomainError::validation("name", "already exists"));
        }

        let am = payment_method::ActiveModel {
            id: NotSet,
            tenant_id: NotSet,
            name: Set(name),
            is_active: Set(true),
        };
        self.db
            .create::<payment_method::Entity>(am)
            .await
            .map_err(|e| unique_or("name", "already exists", e))
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn active_payment_methods(&self) -> Result<Vec<payment_method::Model>, DomainError> {
        Ok(self
            .db
            .find_many::<payment_method::Entity>(
                Condition::all().add(payment_method::Column::IsActive.eq(true)),
            )
            .await?)
    }

    /// # Errors
    /// Returns `DomainError::NotFound` if the payment method does not exist for this tenant.
    pub async fn remove_payment_method(&self, id: Uuid) -> Result<(), DomainError> {
        self.db
            .delete::<payment_method::Entity>(id)
            .await
            .map_err(|e| DomainError::from_scope("Payment method", e))
    }

    /// Append a custom field at the end of the vehicle form.
    ///
    /// # Errors
    /// Returns `DomainError::Validation` for an empty name or unknown field type.
    pub async fn add_vehicle_property_field(
        &self,
        input: NewPropertyField,
    ) -> Result<vehicle_property_field::Model, DomainError> {
        let name = require_non_empty("name", &input.name)?;
        let field_type = input.field_type.trim().to_lowercase();
        if !FIELD_TYPES.contains(&field_type.as_str()) {
            return Err(DomainError::validation(
                "field_type",
                format!("must be one of {}", FIELD_TYPES.join(", ")),
            ));
        }

        let existing = self
            .db
            .count::<vehicle_property_field::Entity>(Condition::all())
            .await?;
        let am = vehicle_property_field::ActiveModel {
            id: NotSet,
            tenant_id: NotSet,
            name: Set(name),
            field_type: Set(field_type),
            required: Set(input.required),
            position: Set(i32::try_from(existing).unwrap_or(i32::MAX)),
        };
        Ok(self.db.create::<vehicle_property_field::Entity>(am).await?)
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn vehicle_property_fields(
        &self,
    ) -> Result<Vec<vehicle_property_field::Model>, DomainError> {
        Ok(self
            .db
            .find::<vehicle_property_field::Entity>()
            .order_by_asc(vehicle_property_field::Column::Position)
            .all()
            .await?)
    }
}
