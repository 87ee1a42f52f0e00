use axum::Router;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use license_server::config::Config;
use license_server::db::{create_pool, init_db, AppState};
use license_server::handlers;
use license_server::lifecycle::{self, OrderCreated};
use license_server::models::CustomerInfo;
use license_server::payments::PayOsClient;

#[derive(Parser, Debug)]
#[command(name = "license-server")]
#[command(about = "License key server with PayOS payment integration")]
struct Cli {
    /// Issue a trial license on startup and print the key (dev mode only)
    #[arg(long)]
    seed: bool,
}

fn seed_trial_license(state: &AppState) {
    let mut conn = state
        .db
        .get()
        .expect("Failed to get db connection for seeding");

    let created = lifecycle::create_order(&mut conn, "trial", CustomerInfo::default())
        .expect("Failed to create seed trial order");

    match created {
        OrderCreated::Completed { order, license } => {
            tracing::info!("============================================");
            tracing::info!("SEED TRIAL LICENSE");
            tracing::info!("Order code:  {}", order.order_code);
            tracing::info!("License key: {}", license.license_key);
            tracing::info!("============================================");
        }
        OrderCreated::Pending(_) => unreachable!("trial tier is free"),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "license_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }
    if !config.payos.is_configured() {
        tracing::warn!(
            "PayOS credentials are not configured; paid checkouts will fail until \
             PAYOS_CLIENT_ID, PAYOS_API_KEY and PAYOS_CHECKSUM_KEY are set"
        );
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        base_url: config.base_url.clone(),
        payos: PayOsClient::new(&config.payos),
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set LICENSE_SERVER_ENV=dev)");
        } else {
            seed_trial_license(&state);
        }
    }

    let app = Router::new()
        .merge(handlers::router())
        .layer(TraceLayer::new_for_http())
        // The desktop client and hosted checkout pages call in from other
        // origins, matching the original deployment.
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("License server listening on {}", addr);
    tracing::info!("Webhook URL: {}/payments/notify", config.base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
