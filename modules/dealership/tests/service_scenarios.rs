#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use dealer_db::secure::TenantId;
use dealership::api::domain_error_to_problem;
use dealership::domain::models::{
    AppConfigInput, NewClient, NewSale, NewTestDrive, NewUser, NewVehicle, VehicleQuery,
    VehicleStatus,
};
use dealership::infra::storage::SeaOrmTenantDirectory;
use dealership::infra::storage::entity::tenant::{Plan, TenantStatus};
use dealership::{DealershipConfig, DomainError, TenantResolver};
use http::{HeaderMap, HeaderValue};

fn corolla(price_cents: i64) -> NewVehicle {
    NewVehicle {
        brand: "Toyota".to_owned(),
        model: "Corolla".to_owned(),
        year: 2022,
        vin: Some(" jtdbr32e720012345 ".to_owned()),
        price_cents,
    }
}

#[tokio::test]
async fn toyota_is_invisible_and_untouchable_for_another_dealer() {
    let env = common::setup().await;
    let ta = env.active_tenant("alpha", Plan::Pro).await;
    let tb = env.active_tenant("bravo", Plan::Pro).await;
    let alpha = env.service(&ta);
    let bravo = env.service(&tb);

    let car = alpha.create_vehicle(corolla(2_500_000)).await.unwrap();
    assert_eq!(car.tenant_id, ta.id);
    assert_eq!(car.vin.as_deref(), Some("JTDBR32E720012345"));

    let err = bravo.get_vehicle(car.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let err = bravo.update_vehicle_price(car.id, 1).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    let foreign = domain_error_to_problem(&err, "/vehicles");
    let missing = domain_error_to_problem(
        &bravo.get_vehicle(uuid::Uuid::new_v4()).await.unwrap_err(),
        "/vehicles",
    );
    assert_eq!(foreign.status, missing.status);
    assert_eq!(foreign.detail, missing.detail);

    assert!(bravo.delete_vehicle(car.id).await.is_err());
    assert_eq!(alpha.get_vehicle(car.id).await.unwrap().price_cents, 2_500_000);

    let toyotas = VehicleQuery {
        brand: Some("Toyota".to_owned()),
        ..Default::default()
    };
    assert!(bravo.list_vehicles(&toyotas).await.unwrap().is_empty());
    assert_eq!(alpha.list_vehicles(&toyotas).await.unwrap().len(), 1);
}

#[tokio::test]
async fn owner_can_reprice_filter_and_delete() {
    let env = common::setup().await;
    let ta = env.active_tenant("alpha", Plan::Basic).await;
    let alpha = env.service(&ta);

    let cheap = alpha.create_vehicle(corolla(1_000_000)).await.unwrap();
    let pricey = alpha.create_vehicle(corolla(4_000_000)).await.unwrap();

    alpha.update_vehicle_price(pricey.id, 3_000_000).await.unwrap();
    alpha
        .set_vehicle_status(cheap.id, VehicleStatus::Reserved)
        .await
        .unwrap();

    let under_35k = VehicleQuery {
        max_price_cents: Some(3_500_000),
        status: Some(VehicleStatus::Available),
        ..Default::default()
    };
    let found = alpha.list_vehicles(&under_35k).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, pricey.id);

    alpha.delete_vehicle(cheap.id).await.unwrap();
    assert!(matches!(
        alpha.get_vehicle(cheap.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn vehicle_and_user_quotas_follow_the_plan() {
    let env = common::setup().await;
    let cfg = dealership::config::PlanQuotas::default().basic;
    let ta = env.active_tenant("alpha", Plan::Basic).await;
    let tb = env.active_tenant("bravo", Plan::Basic).await;
    let alpha = env.service(&ta);
    let bravo = env.service(&tb);

    for i in 0..cfg.max_users {
        alpha
            .create_user(NewUser {
                email: format!("seller{i}@alpha.example"),
                full_name: format!("Seller {i}"),
                role: "seller".to_owned(),
            })
            .await
            .unwrap();
    }
    let err = alpha
        .create_user(NewUser {
            email: "one.more@alpha.example".to_owned(),
            full_name: "One More".to_owned(),
            role: "seller".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::QuotaExceeded { resource: "users", .. }));

    // Quotas are counted per tenant.
    bravo
        .create_user(NewUser {
            email: "seller0@alpha.example".to_owned(),
            full_name: "Seller".to_owned(),
            role: "seller".to_owned(),
        })
        .await
        .unwrap();

    for _ in 0..cfg.max_vehicles {
        alpha.create_vehicle(corolla(1)).await.unwrap();
    }
    assert!(matches!(
        alpha.create_vehicle(corolla(1)).await,
        Err(DomainError::QuotaExceeded { resource: "vehicles", .. })
    ));
    bravo.create_vehicle(corolla(1)).await.unwrap();
}

#[tokio::test]
async fn sales_cannot_reference_another_tenants_records() {
    let env = common::setup().await;
    let ta = env.active_tenant("alpha", Plan::Pro).await;
    let tb = env.active_tenant("bravo", Plan::Pro).await;
    let alpha = env.service(&ta);
    let bravo = env.service(&tb);

    let car = alpha.create_vehicle(corolla(2_000_000)).await.unwrap();
    let alpha_client = alpha
        .create_client(NewClient {
            full_name: "Carlos Ruiz".to_owned(),
            email: Some("Carlos@Example.com".to_owned()),
            phone: None,
        })
        .await
        .unwrap();
    let bravo_client = bravo
        .create_client(NewClient {
            full_name: "Dana".to_owned(),
            email: None,
            phone: None,
        })
        .await
        .unwrap();

    let err = alpha
        .record_sale(NewSale {
            vehicle_id: car.id,
            client_id: bravo_client.id,
            seller_id: None,
            amount_cents: 1_900_000,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "Client" }));

    let err = bravo
        .record_sale(NewSale {
            vehicle_id: car.id,
            client_id: bravo_client.id,
            seller_id: None,
            amount_cents: 1_900_000,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "Vehicle" }));

    let sale = alpha
        .record_sale(NewSale {
            vehicle_id: car.id,
            client_id: alpha_client.id,
            seller_id: None,
            amount_cents: 1_900_000,
        })
        .await
        .unwrap();
    assert_eq!(sale.tenant_id, ta.id);
    assert_eq!(alpha.get_vehicle(car.id).await.unwrap().status, "sold");
    assert_eq!(alpha.sales_for_vehicle(car.id).await.unwrap().len(), 1);
    assert!(bravo.sales_for_vehicle(car.id).await.unwrap().is_empty());
    assert_eq!(alpha.available_vehicle_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_drives_and_notifications_stay_in_tenant() {
    let env = common::setup().await;
    let ta = env.active_tenant("alpha", Plan::Pro).await;
    let tb = env.active_tenant("bravo", Plan::Pro).await;
    let alpha = env.service(&ta);
    let bravo = env.service(&tb);

    let car = alpha.create_vehicle(corolla(2_000_000)).await.unwrap();
    let lead = alpha
        .create_client(NewClient {
            full_name: "Eve".to_owned(),
            email: None,
            phone: Some("555-0199".to_owned()),
        })
        .await
        .unwrap();

    let drive = alpha
        .schedule_test_drive(NewTestDrive {
            vehicle_id: car.id,
            client_id: lead.id,
            scheduled_at: Utc::now() + Duration::hours(2),
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(alpha.upcoming_test_drives().await.unwrap().len(), 1);
    assert!(bravo.upcoming_test_drives().await.unwrap().is_empty());
    assert!(bravo.cancel_test_drive(drive.id).await.is_err());
    alpha.cancel_test_drive(drive.id).await.unwrap();
    assert!(alpha.upcoming_test_drives().await.unwrap().is_empty());

    let seller = alpha
        .create_user(NewUser {
            email: "ana@alpha.example".to_owned(),
            full_name: "Ana".to_owned(),
            role: "seller".to_owned(),
        })
        .await
        .unwrap();
    let broadcast = alpha.notify(None, "Weekly meeting", "Monday 9am").await.unwrap();
    let direct = alpha
        .notify(Some(seller.id), "New lead", "Eve wants a test drive")
        .await
        .unwrap();
    assert!(matches!(
        bravo.notify(Some(seller.id), "Spoof", "").await,
        Err(DomainError::NotFound { entity: "User" })
    ));

    assert_eq!(alpha.unread_notifications(seller.id).await.unwrap().len(), 2);
    assert!(bravo.unread_notifications(seller.id).await.unwrap().is_empty());
    assert!(bravo.mark_notification_read(seller.id, direct.id).await.is_err());
    alpha.mark_notification_read(seller.id, direct.id).await.unwrap();
    let left = alpha.unread_notifications(seller.id).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, broadcast.id);
}

#[tokio::test]
async fn one_reader_cannot_dismiss_a_broadcast_for_everyone() {
    let env = common::setup().await;
    let ta = env.active_tenant("alpha", Plan::Pro).await;
    let alpha = env.service(&ta);

    let staff = |email: &str| NewUser {
        email: email.to_owned(),
        full_name: "Staff".to_owned(),
        role: "seller".to_owned(),
    };
    let ana = alpha.create_user(staff("ana@alpha.example")).await.unwrap();
    let ben = alpha.create_user(staff("ben@alpha.example")).await.unwrap();

    let broadcast = alpha.notify(None, "Inventory day", "Saturday").await.unwrap();
    let to_ben = alpha.notify(Some(ben.id), "Lead", "Call back").await.unwrap();

    assert!(matches!(
        alpha.mark_notification_read(ana.id, broadcast.id).await,
        Err(DomainError::NotFound { entity: "Notification" })
    ));
    assert!(matches!(
        alpha.mark_notification_read(ana.id, to_ben.id).await,
        Err(DomainError::NotFound { entity: "Notification" })
    ));

    let unread = |list: Vec<dealership::infra::storage::entity::notification::Model>| {
        list.into_iter().map(|n| n.id).collect::<Vec<_>>()
    };
    assert_eq!(unread(alpha.unread_notifications(ana.id).await.unwrap()), vec![broadcast.id]);
    assert!(unread(alpha.unread_notifications(ben.id).await.unwrap()).contains(&broadcast.id));
    assert!(unread(alpha.unread_notifications(ben.id).await.unwrap()).contains(&to_ben.id));
}

#[tokio::test]
async fn app_config_is_saved_per_tenant() {
    let env = common::setup().await;
    let ta = env.active_tenant("alpha", Plan::Pro).await;
    let tb = env.active_tenant("bravo", Plan::Pro).await;
    let alpha = env.service(&ta);
    let bravo = env.service(&tb);

    assert!(alpha.app_config().await.unwrap().is_none());

    let input = |name: &str, currency: &str| AppConfigInput {
        dealership_name: name.to_owned(),
        currency: currency.to_owned(),
        locale: "en-US".to_owned(),
        primary_color: Some("#0a84ff".to_owned()),
    };
    let first = alpha.save_app_config(input("Alpha", "usd")).await.unwrap();
    assert_eq!(first.currency, "USD");
    bravo.save_app_config(input("Bravo", "MXN")).await.unwrap();
    let second = alpha.save_app_config(input("Alpha Motors", "EUR")).await.unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.dealership_name, "Alpha Motors");
    assert_eq!(bravo.app_config().await.unwrap().unwrap().currency, "MXN");
    assert!(matches!(
        alpha.save_app_config(input("Alpha", "dollars")).await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn catalog_entries_are_tenant_local() {
    let env = common::setup().await;
    let ta = env.active_tenant("alpha", Plan::Pro).await;
    let tb = env.active_tenant("bravo", Plan::Pro).await;
    let alpha = env.service(&ta);
    let bravo = env.service(&tb);

    alpha.add_payment_method("Cash").await.unwrap();
    bravo.add_payment_method("Cash").await.unwrap();
    assert!(matches!(
        alpha.add_payment_method("Cash").await,
        Err(DomainError::Validation { .. })
    ));
    assert_eq!(alpha.active_payment_methods().await.unwrap().len(), 1);

    let template = alpha
        .create_document_template(dealership::domain::models::NewDocumentTemplate {
            name: "Invoice".to_owned(),
            kind: "invoice".to_owned(),
            body: "Total: {{amount}}".to_owned(),
        })
        .await
        .unwrap();
    assert!(bravo.list_document_templates(None).await.unwrap().is_empty());
    assert!(
        bravo
            .update_document_template_body(template.id, "hijacked".to_owned())
            .await
            .is_err()
    );
    assert_eq!(
        alpha.list_document_templates(Some("invoice")).await.unwrap()[0].body,
        "Total: {{amount}}"
    );

    for name in ["Mileage", "Color"] {
        alpha
            .add_vehicle_property_field(dealership::domain::models::NewPropertyField {
                name: name.to_owned(),
                field_type: "text".to_owned(),
                required: false,
            })
            .await
            .unwrap();
    }
    let fields = alpha.vehicle_property_fields().await.unwrap();
    assert_eq!(
        fields.iter().map(|f| (f.name.as_str(), f.position)).collect::<Vec<_>>(),
        vec![("Mileage", 0), ("Color", 1)]
    );
    assert!(bravo.vehicle_property_fields().await.unwrap().is_empty());
}

#[tokio::test]
async fn platform_admin_works_across_tenants() {
    let env = common::setup().await;
    let ta = env.active_tenant("alpha", Plan::Pro).await;
    let tb = env.active_tenant("bravo", Plan::Enterprise).await;
    assert_eq!(tb.max_vehicles, 10_000);

    assert!(matches!(
        env.admin.provision("alpha", "Dup", Plan::Basic).await,
        Err(DomainError::Validation { .. })
    ));

    let alpha = env.service(&ta);
    let bravo = env.service(&tb);
    alpha.create_vehicle(corolla(1)).await.unwrap();
    alpha.create_vehicle(corolla(2)).await.unwrap();
    bravo.create_vehicle(corolla(3)).await.unwrap();

    let totals = env.admin.vehicle_totals().await.unwrap();
    let count_for = |id| totals.iter().find(|t| t.tenant_id == id).map(|t| t.vehicles);
    assert_eq!(count_for(ta.id), Some(2));
    assert_eq!(count_for(tb.id), Some(1));

    let slugs: Vec<_> = env
        .admin
        .list_tenants()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.slug)
        .collect();
    assert_eq!(slugs, vec!["alpha", "bravo"]);
}

#[tokio::test]
async fn resolver_serves_only_active_tenants() {
    let env = common::setup().await;
    let ta = env.active_tenant("alpha", Plan::Pro).await;
    let cfg = DealershipConfig {
        base_domain: "dealers.example".to_owned(),
        ..Default::default()
    };
    let resolver = TenantResolver::new(
        Arc::new(SeaOrmTenantDirectory::new(env.db.global())),
        &cfg,
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::HOST,
        HeaderValue::from_static("alpha.dealers.example"),
    );
    assert_eq!(resolver.resolve(&headers).await.unwrap().as_uuid(), ta.id);

    env.admin
        .set_status(TenantId::new(ta.id).unwrap(), TenantStatus::Suspended)
        .await
        .unwrap();
    assert!(matches!(
        resolver.resolve(&headers).await,
        Err(DomainError::TenantUnavailable)
    ));

    let pending = env.admin.provision("charlie", "Charlie", Plan::Basic).await.unwrap();
    let mut by_id = HeaderMap::new();
    by_id.insert(
        "x-tenant-id",
        HeaderValue::from_str(&pending.id.to_string()).unwrap(),
    );
    assert!(matches!(
        resolver.resolve(&by_id).await,
        Err(DomainError::TenantUnavailable)
    ));
}
