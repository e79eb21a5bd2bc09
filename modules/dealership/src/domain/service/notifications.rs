use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, NotSet, Set};
use uuid::Uuid;

use super::{DealershipService, require_non_empty};
use crate::domain::error::DomainError;
use crate::infra::storage::entity::{notification, user};

impl DealershipService {
    /// Post a notification to one staff member, or to everyone when `user_id` is `None`.
    ///
    /// # Errors
    /// - `DomainError::NotFound` if `user_id` does not name a user of this tenant
    /// - `DomainError::Validation` if the title is empty
    pub async fn notify(
        &self,
        user_id: Option<Uuid>,
        title: &str,
        message: &str,
    ) -> Result<notification::Model, DomainError> {
        let title = require_non_empty("title", title)?;
        if let Some(id) = user_id {
            self.db
                .find_unique::<user::Entity>(id)
                .await?
                .ok_or_else(|| DomainError::not_found("User"))?;
        }

        let am = notification::ActiveModel {
            id: NotSet,
            tenant_id: NotSet,
            user_id: Set(user_id),
            title: Set(title),
            message: Set(message.to_owned()),
            is_read: Set(false),
            created_at: Set(Utc::now()),
        };
        Ok(self.db.create::<notification::Entity>(am).await?)
    }

    /// Unread notifications visible to `user_id`: addressed to them or broadcast.
    ///
    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn unread_notifications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<notification::Model>, DomainError> {
        let audience = Condition::any()
            .add(notification::Column::UserId.eq(user_id))
            .add(notification::Column::UserId.is_null());
        Ok(self
            .db
            .find::<notification::Entity>()
            .filter(audience)
            .filter(notification::Column::IsRead.eq(false))
            .order_by_desc(notification::Column::CreatedAt)
            .all()
            .await?)
    }

    /// Mark a notification addressed to `user_id` as read.
    ///
    /// Broadcasts share one read flag across all recipients, so they cannot
    /// be dismissed here and stay in every user's unread list.
    ///
    /// # Errors
    /// Returns `DomainError::NotFound` if no notification `id` addressed to
    /// `user_id` exists for this tenant.
    pub async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let addressed = Condition::all()
            .add(notification::Column::Id.eq(id))
            .add(notification::Column::UserId.eq(user_id));
        let am = notification::ActiveModel {
            is_read: Set(true),
            ..Default::default()
        };
        let changed = self
            .db
            .update_many::<notification::Entity>(addressed, am)
            .await?;
        if changed == 0 {
            return Err(DomainError::not_found("Notification"));
        }
        Ok(())
    }
}
