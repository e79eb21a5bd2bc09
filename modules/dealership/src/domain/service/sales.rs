use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, NotSet, Set};
use uuid::Uuid;

use super::DealershipService;
use super::vehicles::validate_price;
use crate::domain::error::DomainError;
use crate::domain::models::{NewSale, NewTestDrive, VehicleStatus};
use crate::infra::storage::entity::{client, sale, test_drive, user, vehicle};

const STAGE_CLOSED: &str = "closed";
const DRIVE_SCHEDULED: &str = "scheduled";

impl DealershipService {
    /// Close a sale and mark the vehicle sold.
    ///
    /// Vehicle, client and seller must all belong to this tenant; ids from
    /// another tenant are reported as not found. The status flip and the sale
    /// insert commit together, and the flip only succeeds from a not-sold
    /// state, so a vehicle can be sold once.
    ///
    /// # Errors
    /// - `DomainError::NotFound` if a referenced record is missing in this tenant
    /// - `DomainError::Validation` if the vehicle is already sold or the amount is negative
    pub async fn record_sale(&self, input: NewSale) -> Result<sale::Model, DomainError> {
        validate_price("amount_cents", input.amount_cents)?;

        self.db
            .in_transaction(move |tx| {
                Box::pin(async move {
                    tx.find_unique::<vehicle::Entity>(input.vehicle_id)
                        .await?
                        .ok_or_else(|| DomainError::not_found("Vehicle"))?;
                    tx.find_unique::<client::Entity>(input.client_id)
                        .await?
                        .ok_or_else(|| DomainError::not_found("Client"))?;
                    if let Some(seller) = input.seller_id {
                        tx.find_unique::<user::Entity>(seller)
                            .await?
                            .ok_or_else(|| DomainError::not_found("User"))?;
                    }

                    let not_sold = Condition::all()
                        .add(vehicle::Column::Id.eq(input.vehicle_id))
                        .add(vehicle::Column::Status.ne(VehicleStatus::Sold.as_str()));
                    let mark_sold = vehicle::ActiveModel {
                        status: Set(VehicleStatus::Sold.as_str().to_owned()),
                        ..Default::default()
                    };
                    if tx.update_many::<vehicle::Entity>(not_sold, mark_sold).await? == 0 {
                        return Err(DomainError::validation(
                            "vehicle_id",
                            "vehicle is already sold",
                        ));
                    }

                    let am = sale::ActiveModel {
                        id: NotSet,
                        tenant_id: NotSet,
                        vehicle_id: Set(input.vehicle_id),
                        client_id: Set(input.client_id),
                        seller_id: Set(input.seller_id),
                        amount_cents: Set(input.amount_cents),
                        stage: Set(STAGE_CLOSED.to_owned()),
                        created_at: Set(Utc::now()),
                    };
                    Ok(tx.create::<sale::Entity>(am).await?)
                })
            })
            .await
    }

    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn sales_for_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<sale::Model>, DomainError> {
        Ok(self
            .db
            .find_many::<sale::Entity>(Condition::all().add(sale::Column::VehicleId.eq(vehicle_id)))
            .await?)
    }

    /// # Errors
    /// - `DomainError::NotFound` if the vehicle or client is missing in this tenant
    /// - `DomainError::Validation` if the vehicle is sold or the slot is in the past
    pub async fn schedule_test_drive(
        &self,
        input: NewTestDrive,
    ) -> Result<test_drive::Model, DomainError> {
        if input.scheduled_at <= Utc::now() {
            return Err(DomainError::validation("scheduled_at", "must be in the future"));
        }
        let car = self.get_vehicle(input.vehicle_id).await?;
        if car.status == VehicleStatus::Sold.as_str() {
            return Err(DomainError::validation("vehicle_id", "vehicle is already sold"));
        }
        self.get_client(input.client_id).await?;

        let am = test_drive::ActiveModel {
            id: NotSet,
            tenant_id: NotSet,
            vehicle_id: Set(car.id),
            client_id: Set(input.client_id),
            scheduled_at: Set(input.scheduled_at),
            status: Set(DRIVE_SCHEDULED.to_owned()),
            notes: Set(input.notes),
        };
        Ok(self.db.create::<test_drive::Entity>(am).await?)
    }

    /// Upcoming test drives, soonest first.
    ///
    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn upcoming_test_drives(&self) -> Result<Vec<test_drive::Model>, DomainError> {
        Ok(self
            .db
            .find::<test_drive::Entity>()
            .filter(test_drive::Column::ScheduledAt.gt(Utc::now()))
            .filter(test_drive::Column::Status.eq(DRIVE_SCHEDULED))
            .order_by_asc(test_drive::Column::ScheduledAt)
            .all()
            .await?)
    }

    /// # Errors
    /// Returns `DomainError::NotFound` if the test drive does not exist for this tenant.
    pub async fn cancel_test_drive(&self, id: Uuid) -> Result<test_drive::Model, DomainError> {
        let am = test_drive::ActiveModel {
            status: Set("cancelled".to_owned()),
            ..Default::default()
        };
        self.db
            .update::<test_drive::Entity>(id, am)
            .await
            .map_err(|e| DomainError::from_scope("Test drive", e))
    }

    /// Vehicles still for sale; convenience for the sales pipeline view.
    ///
    /// # Errors
    /// Returns `DomainError::Database` on storage failure.
    pub async fn available_vehicle_count(&self) -> Result<u64, DomainError> {
        Ok(self
            .db
            .count::<vehicle::Entity>(
                Condition::all().add(vehicle::Column::Status.eq(VehicleStatus::Available.as_str())),
            )
            .await?)
    }
}
