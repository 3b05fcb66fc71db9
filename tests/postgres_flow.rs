mod common;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use common::{RecordingNotifier, auth, create_request, user};
use store_procurement_api::{
    config::AppConfig,
    db::{MIGRATIONS_DIR, create_orm_conn, run_migrations},
    error::AppError,
    models::{Department, NewVendor, OrderAction, OrderStatus, Role, Vendor, VendorStatus},
    routes::params::OrderListQuery,
    services::{lifecycle, order_service},
    state::AppState,
    store::PgStore,
};

// Integration flow against PostgreSQL: create -> edit -> concurrent decisions.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn order_lifecycle_on_postgres() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run the postgres flow."
            );
            return Ok(());
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm, MIGRATIONS_DIR).await?;
    let store = Arc::new(PgStore::new(orm));
    let state = AppState::new(
        AppConfig::for_tests(common::SECRET),
        store.clone(),
        store.clone(),
        store,
        Arc::new(RecordingNotifier::default()),
    );

    // unique emails so reruns do not collide
    let tag = Uuid::new_v4().simple().to_string();
    let manager = user("Manager", &format!("manager-{tag}@college.edu"), Role::StoreManager, None);
    let hod = user(
        "HOD",
        &format!("hod-{tag}@college.edu"),
        Role::Hod,
        Some(Department::Electronics),
    );
    state.users.insert_user(&manager).await?;
    state.users.insert_user(&hod).await?;
    assert_eq!(
        state.users.find_user_by_email(&manager.email).await?.map(|u| u.id),
        Some(manager.id)
    );

    let order = order_service::create_order(
        &state,
        &auth(&manager),
        create_request(
            "Electronics",
            json!([
                { "name": "Resistor kit", "quantity": 4, "unitPrice": 125.5 },
                { "name": "Breadboard", "quantity": 10, "unitPrice": 80 }
            ]),
        ),
    )
    .await?
    .into_data()
    .expect("created order");
    assert_eq!(order.total_price, Decimal::new(1302, 0));

    let stored = state.orders.find_by_id(order.id).await?.expect("stored order");
    assert_eq!(stored.items, order.items);
    assert_eq!(stored.status, OrderStatus::Pending);

    let handles: Vec<_> = [OrderAction::Approve, OrderAction::Reject, OrderAction::QuotationRequested]
        .into_iter()
        .map(|action| {
            let state = state.clone();
            let hod = auth(&hod);
            let id = order.id;
            tokio::spawn(async move { lifecycle::transition_order(&state, &hod, id, action, None).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => successes += 1,
            Err(AppError::InvalidState(_)) => {}
            Err(other) => return Err(other.into()),
        }
    }
    assert_eq!(successes, 1);

    let decided = state.orders.find_by_id(order.id).await?.expect("decided order");
    assert_ne!(decided.status, OrderStatus::Pending);
    assert_eq!(decided.approved_by, Some(hod.id));

    let err = order_service::delete_order(&state, &auth(&manager), order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let listed = order_service::list_orders(&state, &auth(&hod), OrderListQuery::default())
        .await?
        .into_data()
        .expect("listing");
    assert!(listed.orders.iter().all(|o| o.gin_details.department == Department::Electronics));
    assert!(listed.orders.iter().any(|o| o.id == order.id));

    // fractional prices survive the NUMERIC column unchanged
    let fractional = order_service::create_order(
        &state,
        &auth(&manager),
        create_request(
            "Electronics",
            json!([
                { "name": "Capacitor", "quantity": 3, "unitPrice": 0.33 },
                { "name": "Solder wire", "quantity": 7, "unitPrice": 19.99 }
            ]),
        ),
    )
    .await?
    .into_data()
    .expect("fractional order");
    assert_eq!(fractional.total_price, Decimal::new(14092, 2));

    let stored = state.orders.find_by_id(fractional.id).await?.expect("stored order");
    assert_eq!(stored.total_price, fractional.total_price);
    assert_eq!(stored.items, fractional.items);
    let line_sum: Decimal = stored.items.iter().filter_map(|i| i.line_total()).sum();
    assert_eq!(stored.total_price, line_sum);

    let err = order_service::create_order(
        &state,
        &auth(&manager),
        create_request("Electronics", json!([{ "name": "Capacitor", "quantity": 3, "unitPrice": 0.333 }])),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // LIKE wildcards in the vendor filter match literally
    let wildcard = OrderListQuery {
        vendor: Some("%".into()),
        ..Default::default()
    };
    let listed = order_service::list_orders(&state, &auth(&hod), wildcard)
        .await?
        .into_data()
        .expect("listing");
    assert!(listed.orders.iter().all(|o| o.vendor_details.name.contains('%')));
    assert!(!listed.orders.iter().any(|o| o.id == order.id));

    // vendor emails are unique at the database level
    let vendor = Vendor::create(
        NewVendor {
            name: "Shree Stationers".into(),
            email: format!("sales-{tag}@shree.test"),
            phone: "9876543210".into(),
            address: "Pune".into(),
            gst_number: None,
            products: vec!["Pens".into()],
            status: VendorStatus::Active,
        },
        chrono::Utc::now(),
    );
    state.vendors.insert_vendor(&vendor).await?;
    let mut twin = vendor.clone();
    twin.id = Uuid::new_v4();
    assert!(matches!(
        state.vendors.insert_vendor(&twin).await,
        Err(AppError::Validation(_))
    ));

    let mut rated = state.vendors.find_vendor(vendor.id).await?.expect("stored vendor");
    assert_eq!(rated.products, vendor.products);
    rated.set_rating(3.5, chrono::Utc::now());
    assert!(state.vendors.update_vendor(&rated).await?);
    let stored = state.vendors.find_vendor(vendor.id).await?.expect("stored vendor");
    assert_eq!(stored.rating, 3.5);

    assert!(state.vendors.delete_vendor(vendor.id).await?);
    assert!(!state.vendors.update_vendor(&rated).await?);

    Ok(())
}
