use anyhow::Context;
use chrono::Utc;
use uuid::Uuid;

use store_procurement_api::{
    db::{MIGRATIONS_DIR, create_orm_conn, run_migrations},
    error::AppError,
    models::{Department, NewVendor, Role, User, Vendor, VendorStatus},
    services::auth_service::hash_password,
    store::{PgStore, UserStore, VendorStore},
};

/// Demo accounts: one store manager, one management user and an HOD for
/// every department.
fn demo_accounts() -> Vec<(String, String, Role, Option<Department>)> {
    let mut accounts = vec![
        (
            "Store Manager".to_string(),
            "manager@college.edu".to_string(),
            Role::StoreManager,
            None,
        ),
        (
            "Management".to_string(),
            "management@college.edu".to_string(),
            Role::Management,
            None,
        ),
    ];
    for department in Department::ALL {
        let slug = department.as_str().to_lowercase().replace(' ', "-");
        accounts.push((
            format!("HOD {department}"),
            format!("hod.{slug}@college.edu"),
            Role::Hod,
            Some(department),
        ));
    }
    accounts
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,store_procurement_api=debug".into()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set to seed")?;
    let password = std::env::var("SEED_PASSWORD").unwrap_or_else(|_| "password123".to_string());

    let orm = create_orm_conn(&database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm, MIGRATIONS_DIR).await?;
    let store = PgStore::new(orm);

    for (full_name, email, role, department) in demo_accounts() {
        if let Some(existing) = store.find_user_by_email(&email).await? {
            println!("{email} already exists ({})", existing.id);
            continue;
        }
        let user = User {
            id: Uuid::new_v4(),
            full_name,
            email,
            password_hash: hash_password(&password)?,
            role,
            department,
            created_at: Utc::now(),
        };
        store.insert_user(&user).await?;
        println!("Created {} {} ({})", user.role, user.email, user.id);
    }

    let vendor = Vendor::create(
        NewVendor {
            name: "Shree Stationers".to_string(),
            email: "sales@shree-stationers.in".to_string(),
            phone: "9876543210".to_string(),
            address: "Shivaji Nagar, Pune".to_string(),
            gst_number: Some("27AAPFU0939F1ZV".to_string()),
            products: vec!["Registers".to_string(), "Pens".to_string()],
            status: VendorStatus::Active,
        },
        Utc::now(),
    );
    match store.insert_vendor(&vendor).await {
        Ok(()) => println!("Created vendor {} ({})", vendor.email, vendor.id),
        Err(AppError::Validation(_)) => println!("{} already exists", vendor.email),
        Err(err) => return Err(err.into()),
    }

    println!("Seed completed");
    Ok(())
}
