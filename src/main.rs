use std::sync::Arc;

use tokio::{signal, sync::mpsc};
use tracing::{info, warn};

use boostline_api as api;

use api::checkout::CheckoutManager;
use api::config::ContentSourceKind;
use api::services::{
    CheckoutService, ContentSource, FlatFileCatalog, PayPalGateway, StoreCatalogService,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    // Init events
    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = api::events::EventSender::new(event_tx);
    tokio::spawn(api::events::process_events(event_rx));

    // Content source: row store or flat files, both yielding the same shapes
    let (catalog, db): (Arc<dyn ContentSource>, Option<Arc<api::db::DbPool>>) =
        match cfg.content_source {
            ContentSourceKind::Database => {
                let pool = Arc::new(api::db::establish_connection(&cfg).await?);
                (
                    Arc::new(StoreCatalogService::new(pool.clone())),
                    Some(pool),
                )
            }
            ContentSourceKind::Flatfile => {
                let catalog = FlatFileCatalog::load(cfg.content_dir())?;
                (Arc::new(catalog), None)
            }
        };

    if cfg.paypal.client_id.is_empty() {
        warn!("PayPal client id not configured; payment submissions will fail");
    }
    let gateway = Arc::new(PayPalGateway::new(cfg.paypal.clone()));
    let manager = Arc::new(CheckoutManager::new());
    let checkout = Arc::new(CheckoutService::new(
        catalog.clone(),
        manager,
        gateway,
        event_sender.clone(),
    ));

    let state = Arc::new(api::AppState {
        config: cfg.clone(),
        event_sender,
        catalog,
        checkout,
        db,
    });
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(cfg.server_addr()).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
