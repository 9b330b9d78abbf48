use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use showbooker_server::config::Config;
use showbooker_server::notifications::LogNotifier;
use showbooker_server::payments::StripeClient;
use showbooker_server::routes::create_routes;
use showbooker_server::services::{CheckoutService, PaymentEventHandler};
use showbooker_server::state::AppState;
use showbooker_server::stores::{PgInventoryStore, PgOrderStore};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    // Every collaborator is constructed here and injected; nothing holds a
    // module-scope client.
    let inventory = Arc::new(PgInventoryStore::new(pool.clone()));
    let orders = Arc::new(PgOrderStore::new(pool));
    let provider = Arc::new(StripeClient::new(config.stripe_secret_key.clone()));
    let notifier = Arc::new(LogNotifier::new());

    let checkout = CheckoutService::new(
        inventory.clone(),
        orders.clone(),
        provider,
        config.app_base_url.clone(),
    );
    let payment_events = PaymentEventHandler::new(
        orders,
        inventory,
        notifier,
        config.stripe_webhook_secret.clone(),
    );

    let app = create_routes(AppState::new(checkout, payment_events));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
