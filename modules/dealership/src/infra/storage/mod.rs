pub mod entity;
pub mod migrations;
pub mod tenant_directory;

pub use tenant_directory::SeaOrmTenantDirectory;
