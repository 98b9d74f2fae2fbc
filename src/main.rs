//! Storefront cart service: session-scoped cart routes over the local
//! store, plus the Shopify checkout hand-off.

use anyhow::Result;
use axum::{extract::{Path, State}, http::StatusCode, routing::{get, post, put}, Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_cart::{submit_cart, CartLine, CartStore, CartSync, CartTotals, JsonFileStorage, Product, StorefrontClient};

struct Session {
    store: CartStore,
    remote_cart_id: Option<String>,
}

#[derive(Clone)]
struct AppState {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    client: StorefrontClient,
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let token = std::env::var("SHOPIFY_STOREFRONT_TOKEN")?;
    let timeout: u64 = std::env::var("SHOPIFY_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(30);
    let client = match std::env::var("SHOPIFY_API_URL") {
        Ok(url) => StorefrontClient::with_base_url(&url, &token, timeout)?,
        Err(_) => StorefrontClient::new(&std::env::var("SHOPIFY_STORE_DOMAIN")?, &token, timeout)?,
    };
    let data_dir = PathBuf::from(std::env::var("CART_DATA_DIR").unwrap_or_else(|_| "./data/carts".to_string()));
    let state = AppState { sessions: Arc::new(Mutex::new(HashMap::new())), client, data_dir };

    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-cart"})) }))
        .route("/api/v1/cart/:session", get(view_cart).post(add_item).delete(clear_cart))
        .route("/api/v1/cart/:session/lines/:line_id", put(update_line).delete(remove_line))
        .route("/api/v1/cart/:session/checkout", post(checkout))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8083".to_string());
    tracing::info!("🚀 Storefront cart listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct CartView {
    items: Vec<CartLine>,
    totals: CartTotals,
}

fn cart_view(session: &Session) -> Json<CartView> {
    Json(CartView {
        items: session.store.cart().lines().to_vec(),
        totals: session.store.cart().totals().clone(),
    })
}

fn session_entry<'a>(sessions: &'a mut HashMap<String, Session>, data_dir: &FsPath, key: &str) -> &'a mut Session {
    sessions.entry(key.to_owned()).or_insert_with(|| Session {
        store: CartStore::open(Box::new(JsonFileStorage::with_store_key(data_dir, key))),
        remote_cart_id: None,
    })
}

async fn view_cart(State(s): State<AppState>, Path(session): Path<String>) -> Json<CartView> {
    let mut sessions = s.sessions.lock().await;
    cart_view(session_entry(&mut sessions, &s.data_dir, &session))
}

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    product: Product,
    quantity: Option<u32>,
    variant_id: Option<String>,
}

async fn add_item(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<AddItemRequest>) -> (StatusCode, Json<CartView>) {
    let mut sessions = s.sessions.lock().await;
    let entry = session_entry(&mut sessions, &s.data_dir, &session);
    entry.store.add_item(r.product, r.quantity.unwrap_or(1), r.variant_id);
    (StatusCode::CREATED, cart_view(entry))
}

#[derive(Debug, Deserialize)]
struct UpdateLineRequest {
    quantity: u32,
}

async fn update_line(State(s): State<AppState>, Path((session, line_id)): Path<(String, String)>, Json(r): Json<UpdateLineRequest>) -> Json<CartView> {
    let mut sessions = s.sessions.lock().await;
    let entry = session_entry(&mut sessions, &s.data_dir, &session);
    // Unknown line ids are an expected race with removal; the response is
    // the current cart either way.
    entry.store.update_quantity(&line_id, r.quantity);
    cart_view(entry)
}

async fn remove_line(State(s): State<AppState>, Path((session, line_id)): Path<(String, String)>) -> Json<CartView> {
    let mut sessions = s.sessions.lock().await;
    let entry = session_entry(&mut sessions, &s.data_dir, &session);
    entry.store.remove_item(&line_id);
    cart_view(entry)
}

async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> StatusCode {
    let mut sessions = s.sessions.lock().await;
    session_entry(&mut sessions, &s.data_dir, &session).store.clear();
    StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize)]
struct CheckoutResponse {
    checkout_url: String,
    remote_cart_id: String,
    submitted_lines: usize,
    skipped_lines: usize,
}

async fn checkout(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CheckoutResponse>, (StatusCode, String)> {
    let mut sessions = s.sessions.lock().await;
    let entry = session_entry(&mut sessions, &s.data_dir, &session);

    let mut sync = CartSync::resume(s.client.clone(), entry.remote_cart_id.take());
    let result = submit_cart(&mut entry.store, &mut sync).await;
    // Keep the remote cart id observed during the attempt so a retry
    // extends the same cart; a successful hand-off leaves nothing behind.
    entry.remote_cart_id = sync.detach();

    match result {
        Ok(o) => Ok(Json(CheckoutResponse {
            checkout_url: o.checkout_url,
            remote_cart_id: o.remote_cart_id,
            submitted_lines: o.submitted_lines,
            skipped_lines: o.skipped_lines,
        })),
        Err(e) => Err((StatusCode::BAD_GATEWAY, e.to_string())),
    }
}
