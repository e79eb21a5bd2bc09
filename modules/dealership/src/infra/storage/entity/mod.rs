//! `SeaORM` entities.
//!
//! `tenant` is the platform-level registry; every other entity is owned by
//! one tenant and implements `TenantScopedEntity` through the derive.

pub mod app_config;
pub mod client;
pub mod document_template;
pub mod notification;
pub mod payment_method;
pub mod sale;
pub mod tenant;
pub mod test_drive;
pub mod user;
pub mod vehicle;
pub mod vehicle_property_field;
