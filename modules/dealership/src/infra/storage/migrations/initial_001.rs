//! Tenant registry plus every tenant-scoped table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tenants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tenants::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tenants::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Tenants::Name).string().not_null())
                    .col(ColumnDef::new(Tenants::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Tenants::Plan).string_len(16).not_null())
                    .col(ColumnDef::new(Tenants::MaxUsers).integer().not_null())
                    .col(ColumnDef::new(Tenants::MaxVehicles).integer().not_null())
                    .col(
                        ColumnDef::new(Tenants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        let mut users = scoped_table(Users::Table, Users::Id, Users::TenantId);
        users
            .col(ColumnDef::new(Users::Email).string().not_null())
            .col(ColumnDef::new(Users::FullName).string().not_null())
            .col(ColumnDef::new(Users::Role).string().not_null())
            .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
            .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null());
        create_scoped(manager, users, "idx_users_tenant", Users::Table, Users::TenantId).await?;

        let mut vehicles = scoped_table(Vehicles::Table, Vehicles::Id, Vehicles::TenantId);
        vehicles
            .col(ColumnDef::new(Vehicles::Brand).string().not_null())
            .col(ColumnDef::new(Vehicles::Model).string().not_null())
            .col(ColumnDef::new(Vehicles::Year).integer().not_null())
            .col(ColumnDef::new(Vehicles::Vin).string())
            .col(ColumnDef::new(Vehicles::PriceCents).big_integer().not_null())
            .col(
                ColumnDef::new(Vehicles::Status)
                    .string()
                    .not_null()
                    .default("available"),
            )
            .col(ColumnDef::new(Vehicles::CreatedAt).timestamp_with_time_zone().not_null());
        create_scoped(manager, vehicles, "idx_vehicles_tenant", Vehicles::Table, Vehicles::TenantId)
            .await?;

        let mut clients = scoped_table(Clients::Table, Clients::Id, Clients::TenantId);
        clients
            .col(ColumnDef::new(Clients::FullName).string().not_null())
            .col(ColumnDef::new(Clients::Email).string())
            .col(ColumnDef::new(Clients::Phone).string())
            .col(ColumnDef::new(Clients::CreatedAt).timestamp_with_time_zone().not_null());
        create_scoped(manager, clients, "idx_clients_tenant", Clients::Table, Clients::TenantId)
            .await?;

        let mut sales = scoped_table(Sales::Table, Sales::Id, Sales::TenantId);
        sales
            .col(ColumnDef::new(Sales::VehicleId).uuid().not_null())
            .col(ColumnDef::new(Sales::ClientId).uuid().not_null())
            .col(ColumnDef::new(Sales::SellerId).uuid())
            .col(ColumnDef::new(Sales::AmountCents).big_integer().not_null())
            .col(ColumnDef::new(Sales::Stage).string().not_null())
            .col(ColumnDef::new(Sales::CreatedAt).timestamp_with_time_zone().not_null());
        create_scoped(manager, sales, "idx_sales_tenant", Sales::Table, Sales::TenantId).await?;

        let mut test_drives = scoped_table(TestDrives::Table, TestDrives::Id, TestDrives::TenantId);
        test_drives
            .col(ColumnDef::new(TestDrives::VehicleId).uuid().not_null())
            .col(ColumnDef::new(TestDrives::ClientId).uuid().not_null())
            .col(
                ColumnDef::new(TestDrives::ScheduledAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(ColumnDef::new(TestDrives::Status).string().not_null())
            .col(ColumnDef::new(TestDrives::Notes).text());
        create_scoped(
            manager,
            test_drives,
            "idx_test_drives_tenant",
            TestDrives::Table,
            TestDrives::TenantId,
        )
        .await?;

        let mut notifications =
            scoped_table(Notifications::Table, Notifications::Id, Notifications::TenantId);
        notifications
            .col(ColumnDef::new(Notifications::UserId).uuid())
            .col(ColumnDef::new(Notifications::Title).string().not_null())
            .col(ColumnDef::new(Notifications::Message).text().not_null())
            .col(
                ColumnDef::new(Notifications::IsRead)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(
                ColumnDef::new(Notifications::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            );
        create_scoped(
            manager,
            notifications,
            "idx_notifications_tenant",
            Notifications::Table,
            Notifications::TenantId,
        )
        .await?;

        let mut templates = scoped_table(
            DocumentTemplates::Table,
            DocumentTemplates::Id,
            DocumentTemplates::TenantId,
        );
        templates
            .col(ColumnDef::new(DocumentTemplates::Name).string().not_null())
            .col(ColumnDef::new(DocumentTemplates::Kind).string().not_null())
            .col(ColumnDef::new(DocumentTemplates::Body).text().not_null())
            .col(
                ColumnDef::new(DocumentTemplates::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            );
        create_scoped(
            manager,
            templates,
            "idx_document_templates_tenant",
            DocumentTemplates::Table,
            DocumentTemplates::TenantId,
        )
        .await?;

        let mut payment_methods =
            scoped_table(PaymentMethods::Table, PaymentMethods::Id, PaymentMethods::TenantId);
        payment_methods
            .col(ColumnDef::new(PaymentMethods::Name).string().not_null())
            .col(
                ColumnDef::new(PaymentMethods::IsActive)
                    .boolean()
                    .not_null()
                    .default(true),
            );
        create_scoped(
            manager,
            payment_methods,
            "idx_payment_methods_tenant",
            PaymentMethods::Table,
            PaymentMethods::TenantId,
        )
        .await?;

        let mut property_fields = scoped_table(
            VehiclePropertyFields::Table,
            VehiclePropertyFields::Id,
            VehiclePropertyFields::TenantId,
        );
        property_fields
            .col(ColumnDef::new(VehiclePropertyFields::Name).string().not_null())
            .col(ColumnDef::new(VehiclePropertyFields::FieldType).string().not_null())
            .col(
                ColumnDef::new(VehiclePropertyFields::Required)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(
                ColumnDef::new(VehiclePropertyFields::Position)
                    .integer()
                    .not_null()
                    .default(0),
            );
        create_scoped(
            manager,
            property_fields,
            "idx_vehicle_property_fields_tenant",
            VehiclePropertyFields::Table,
            VehiclePropertyFields::TenantId,
        )
        .await?;

        // One config row per tenant; the unique index is the upsert conflict target.
        let mut app_configs = scoped_table(AppConfigs::Table, AppConfigs::Id, AppConfigs::TenantId);
        app_configs
            .col(ColumnDef::new(AppConfigs::DealershipName).string().not_null())
            .col(ColumnDef::new(AppConfigs::Currency).string_len(3).not_null())
            .col(ColumnDef::new(AppConfigs::Locale).string().not_null())
            .col(ColumnDef::new(AppConfigs::PrimaryColor).string())
            .col(
                ColumnDef::new(AppConfigs::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            );
        manager.create_table(app_configs).await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_app_configs_tenant")
                    .table(AppConfigs::Table)
                    .col(AppConfigs::TenantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            AppConfigs::Table.into_iden(),
            VehiclePropertyFields::Table.into_iden(),
            PaymentMethods::Table.into_iden(),
            DocumentTemplates::Table.into_iden(),
            Notifications::Table.into_iden(),
            TestDrives::Table.into_iden(),
            Sales::Table.into_iden(),
            Clients::Table.into_iden(),
            Vehicles::Table.into_iden(),
            Users::Table.into_iden(),
            Tenants::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

/// `CREATE TABLE` skeleton shared by every tenant-owned table.
fn scoped_table<T>(table: T, id: T, tenant_id: T) -> TableCreateStatement
where
    T: Iden + 'static,
{
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(id).uuid().not_null().primary_key())
        .col(ColumnDef::new(tenant_id).uuid().not_null())
        .to_owned()
}

async fn create_scoped<T>(
    manager: &SchemaManager<'_>,
    table_stmt: TableCreateStatement,
    index_name: &str,
    table: T,
    tenant_id: T,
) -> Result<(), DbErr>
where
    T: Iden + 'static,
{
    manager.create_table(table_stmt).await?;
    manager
        .create_index(
            Index::create()
                .name(index_name)
                .table(table)
                .col(tenant_id)
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
    Slug,
    Name,
    Status,
    Plan,
    MaxUsers,
    MaxVehicles,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    TenantId,
    Email,
    FullName,
    Role,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Vehicles {
    Table,
    Id,
    TenantId,
    Brand,
    Model,
    Year,
    Vin,
    PriceCents,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    TenantId,
    FullName,
    Email,
    Phone,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Sales {
    Table,
    Id,
    TenantId,
    VehicleId,
    ClientId,
    SellerId,
    AmountCents,
    Stage,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TestDrives {
    Table,
    Id,
    TenantId,
    VehicleId,
    ClientId,
    ScheduledAt,
    Status,
    Notes,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    TenantId,
    UserId,
    Title,
    Message,
    IsRead,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DocumentTemplates {
    Table,
    Id,
    TenantId,
    Name,
    Kind,
    Body,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PaymentMethods {
    Table,
    Id,
    TenantId,
    Name,
    IsActive,
}

#[derive(DeriveIden)]
enum VehiclePropertyFields {
    Table,
    Id,
    TenantId,
    Name,
    FieldType,
    Required,
    Position,
}

#[derive(DeriveIden)]
enum AppConfigs {
    Table,
    Id,
    TenantId,
    DealershipName,
    Currency,
    Locale,
    PrimaryColor,
    UpdatedAt,
}
