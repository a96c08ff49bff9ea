//! Shopper HTTP surface
//!
//! Thin glue over the domain: handlers load, delegate, and map errors to
//! status codes. No pricing, resolution or cart rule lives here.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cart_store::CartSessions;
use crate::catalog::Catalog;
use crate::checkout::{CheckoutSnapshot, CHECKOUT_SUBJECT};
use crate::domain::aggregates::{Cart, LineItem, Product};
use crate::domain::browse::{
    cheapest_price, project, resolve, DisplayProjection, Selection, SpecAxis, SpecificationIndex,
};
use crate::domain::value_objects::Money;
use crate::session::ProductView;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub carts: CartSessions,
    pub nats: Option<async_nats::Client>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "emporium"})) }))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/:id", get(get_product))
        .route("/api/v1/products/:id/resolve", post(resolve_product))
        .route("/api/v1/cart/:session", get(get_cart).post(add_to_cart).put(update_cart_line).delete(clear_cart))
        .route("/api/v1/cart/:session/remove", post(remove_cart_line))
        .route("/api/v1/checkout", post(submit_checkout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub category: Option<String>,
    /// The listing's "from" price: base price, or the cheapest variant.
    pub display_price: Money,
    pub has_variants: bool,
}

impl ProductSummary {
    fn of(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.image.clone(),
            category: product.category.clone(),
            display_price: cheapest_price(product),
            has_variants: product.has_variants(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub axes: Vec<SpecAxis>,
    pub display: DisplayProjection,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub selection: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub fully_selected: bool,
    pub variant_id: Option<String>,
    pub display: DisplayProjection,
}

#[derive(Debug, Serialize)]
pub struct CartLine {
    pub key: String,
    #[serde(flatten)]
    pub item: LineItem,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLine>,
    pub total_price: Money,
    pub total_items: u32,
}

impl CartResponse {
    fn of(cart: &Cart) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|i| CartLine { key: i.identity_key(), item: i.clone() })
                .collect(),
            total_price: cart.total_price(),
            total_items: cart.total_items(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    #[serde(default)]
    pub selection: BTreeMap<String, String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub key: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct RemoveCartRequest {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub session_id: String,
}

async fn list_products(State(s): State<AppState>) -> Result<Json<Vec<ProductSummary>>, (StatusCode, String)> {
    let products = s.catalog.list_published().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(products.iter().map(ProductSummary::of).collect()))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<ProductDetail>, (StatusCode, String)> {
    let product = s.catalog.get(&id).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .filter(|p| p.is_published())
        .ok_or((StatusCode::NOT_FOUND, "Not found".to_string()))?;
    let index = SpecificationIndex::from_variants(&product.variants);
    let display = project(&product, &resolve(&product.variants, &index, &Selection::new()));
    Ok(Json(ProductDetail { axes: index.axes().to_vec(), display, product }))
}

async fn resolve_product(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<ResolveRequest>) -> Result<Json<ResolveResponse>, (StatusCode, String)> {
    let product = s.catalog.get(&id).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .filter(|p| p.is_published())
        .ok_or((StatusCode::NOT_FOUND, "Not found".to_string()))?;
    let index = SpecificationIndex::from_variants(&product.variants);
    let mut selection = Selection::from(r.selection);
    selection.retain_known(&index);
    let resolution = resolve(&product.variants, &index, &selection);
    Ok(Json(ResolveResponse {
        fully_selected: resolution.fully_selected,
        variant_id: resolution.variant.map(|v| v.id.clone()),
        display: project(&product, &resolution),
    }))
}

async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartResponse>, (StatusCode, String)> {
    let cart = s.carts.load(&session).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(CartResponse::of(&cart)))
}

async fn add_to_cart(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<AddToCartRequest>) -> Result<(StatusCode, Json<CartResponse>), (StatusCode, String)> {
    let product = s.catalog.get(&r.product_id).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .filter(|p| p.is_published())
        .ok_or((StatusCode::NOT_FOUND, "Not found".to_string()))?;
    let view = ProductView::open_with_selection(product, r.selection, r.quantity.unwrap_or(1));
    let item = view.line_item().map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let cart = s.carts.modify(&session, |c| c.add(item)).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok((StatusCode::CREATED, Json(CartResponse::of(&cart))))
}

async fn update_cart_line(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<UpdateCartRequest>) -> Result<Json<CartResponse>, (StatusCode, String)> {
    let cart = s.carts.modify(&session, |c| c.update_quantity(&r.key, r.quantity)).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(CartResponse::of(&cart)))
}

async fn remove_cart_line(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<RemoveCartRequest>) -> Result<Json<CartResponse>, (StatusCode, String)> {
    let cart = s.carts.modify(&session, |c| c.remove(&r.key)).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(CartResponse::of(&cart)))
}

async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<StatusCode, (StatusCode, String)> {
    s.carts.clear(&session).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit_checkout(State(s): State<AppState>, Json(r): Json<CheckoutRequest>) -> Result<(StatusCode, Json<CheckoutSnapshot>), (StatusCode, String)> {
    let cart = s.carts.load(&r.session_id).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if cart.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Cart is empty".to_string()));
    }
    let snapshot = CheckoutSnapshot::from_cart(&r.session_id, &cart);
    if let Some(nats) = &s.nats {
        let payload = serde_json::to_vec(&snapshot.submitted_event()).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        if let Err(err) = nats.publish(CHECKOUT_SUBJECT.to_string(), payload.into()).await {
            tracing::warn!(error = %err, "checkout event publish failed");
        }
    }
    tracing::info!(checkout_id = %snapshot.checkout_id, session = %r.session_id, total_items = snapshot.total_items, "checkout submitted");
    Ok((StatusCode::CREATED, Json(snapshot)))
}
