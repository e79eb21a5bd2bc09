//! Inputs accepted by the tenant-facing services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Available,
    Reserved,
    Sold,
}

impl VehicleStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVehicle {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub vin: Option<String>,
    pub price_cents: i64,
}

/// Listing filter; unset fields do not constrain.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VehicleQuery {
    pub brand: Option<String>,
    pub status: Option<VehicleStatus>,
    pub max_price_cents: Option<i64>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewClient {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSale {
    pub vehicle_id: Uuid,
    pub client_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTestDrive {
    pub vehicle_id: Uuid,
    pub client_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDocumentTemplate {
    pub name: String,
    pub kind: String,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPropertyField {
    pub name: String,
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfigInput {
    pub dealership_name: String,
    pub currency: String,
    pub locale: String,
    pub primary_color: Option<String>,
}
