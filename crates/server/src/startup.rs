use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use service::{
    items::ItemService,
    runtime,
    storage::{fs_image_store::FsImageStore, json_item_store::JsonItemStore},
};

/// Shared handler state: the item service over the file-backed stores.
#[derive(Clone)]
pub struct ServerState {
    pub items: Arc<ItemService<JsonItemStore, FsImageStore>>,
}

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8000);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Storage locations from configs, falling back to defaults plus `DATA_DIR`.
fn load_storage() -> configs::StorageConfig {
    let mut storage = configs::load_default().map(|cfg| cfg.storage).unwrap_or_default();
    storage.normalize_from_env();
    storage
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let storage = load_storage();
    let images_dir = storage.images_path().display().to_string();
    runtime::ensure_env(&storage.data_dir, &images_dir).await?;

    let item_store = JsonItemStore::new(storage.items_path()).await?;
    let image_store = FsImageStore::new(storage.images_path()).await?;
    let state = ServerState { items: Arc::new(ItemService::new(item_store, image_store)) };

    let cors = build_cors();
    let app: Router = routes::build_router(state, cors);

    let addr = load_bind_addr()?;
    info!(%addr, "starting items api server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
