use std::net::SocketAddr;
use std::sync::Arc;

use localshop_api::{app, AppState};
use localshop_catalog::PricingConfig;
use localshop_core::Store;
use localshop_order::OrderService;
use localshop_store::app_config::{Backend, Config};
use localshop_store::{DbClient, MemoryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "localshop_api=debug,localshop_order=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting LocalShop API on port {}", config.server.port);

    let store: Arc<dyn Store> = match config.database.backend {
        Backend::Postgres => {
            let db = DbClient::new(&config.database.url, config.database.max_connections).await?;
            db.migrate().await?;
            Arc::new(db)
        }
        Backend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on exit");
            Arc::new(MemoryStore::seeded().await)
        }
    };

    let pricing = PricingConfig {
        tax_rate: config.checkout.tax_rate,
        shipping_cost: config.checkout.shipping_cost,
    };
    tracing::info!(
        tax_rate = %pricing.tax_rate,
        shipping_cost = %pricing.shipping_cost,
        stock_policy = ?config.checkout.stock_policy,
        "Checkout configured"
    );
    let orders = OrderService::new(store, pricing, config.checkout.stock_policy);

    let app = app(AppState::new(orders));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
