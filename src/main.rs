use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use store_procurement_api::{
    config::AppConfig,
    db::{MIGRATIONS_DIR, create_orm_conn, run_migrations},
    notify::{LogNotifier, Notifier, WebhookNotifier},
    routes::create_app,
    state::AppState,
    store::PgStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,store_procurement_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));

    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
        Some(url) => {
            tracing::info!(url = %url, "notifications go to webhook relay");
            Arc::new(WebhookNotifier::new(url.clone()))
        }
        None => Arc::new(LogNotifier),
    };

    let state = match config.database_url.clone() {
        Some(url) => {
            let orm = create_orm_conn(&url).await?;
            run_migrations(&orm, MIGRATIONS_DIR).await?;
            let store = Arc::new(PgStore::new(orm));
            AppState::new(config, store.clone(), store.clone(), store, notifier)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, data is kept in memory only");
            let mut state = AppState::in_memory(config);
            state.notifier = notifier;
            state
        }
    };

    let app = create_app(state);

    tracing::info!("listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
