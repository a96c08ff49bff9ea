//! Emporium - Variant-aware Storefront Service

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emporium::api::{router, AppState};
use emporium::cart_store::{CartSessions, InMemoryBlobStore};
use emporium::catalog::{Catalog, InMemoryCatalog};
use emporium::import::{ImportRequest, Importer, IMPORT_SUBJECT};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let currency = std::env::var("CURRENCY").unwrap_or_else(|_| "TWD".to_string());
    let catalog: Arc<dyn Catalog> = Arc::new(InMemoryCatalog::new());
    let carts = CartSessions::new(Arc::new(InMemoryBlobStore::new()), &currency);
    let nats = match std::env::var("NATS_URL") {
        Ok(url) => async_nats::connect(&url).await.ok(),
        Err(_) => None,
    };

    seed_catalog(&catalog, &currency, nats.as_ref()).await?;

    let state = AppState { catalog, carts, nats };
    let app = router(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8083".to_string());
    tracing::info!("🚀 Emporium storefront listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}

/// Imports the listings named by `CATALOG_SEED` (a JSON file of import
/// requests) and publishes them so the storefront starts with something to
/// sell. Raised events go to NATS when a client is connected.
async fn seed_catalog(catalog: &Arc<dyn Catalog>, currency: &str, nats: Option<&async_nats::Client>) -> Result<()> {
    let Ok(path) = std::env::var("CATALOG_SEED") else { return Ok(()) };
    let requests: Vec<ImportRequest> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    let importer = Importer::new(catalog.clone(), currency);

    let mut listings = 0;
    for request in requests {
        let (mut product, mut events) = importer.import(request)?;
        product.publish()?;
        events.extend(product.take_events());
        catalog.upsert(product)?;
        if let Some(client) = nats {
            for event in &events {
                let payload = serde_json::to_vec(event)?;
                if let Err(err) = client.publish(IMPORT_SUBJECT.to_string(), payload.into()).await {
                    tracing::warn!(error = %err, "seed event publish failed");
                }
            }
        }
        listings += 1;
    }
    tracing::info!(listings, seed = %path, "seeded catalog");
    Ok(())
}
