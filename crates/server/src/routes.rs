use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::startup::ServerState;

pub mod images;
pub mod items;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Plain-text index of the available routes. Deliberately answers 400.
pub async fn index() -> (StatusCode, String) {
    let body = [
        "Available:",
        "[GET]\t\t/items",
        "[GET]\t\t/items/:id",
        "[POST]\t\t/items",
        "[DELETE]\t/items/:id",
        "[GET]\t\t/items/:id/images/:imgId",
        "[POST]\t\t/items/:id/images",
        "[DELETE]\t/items/:id/images/:imgId",
    ]
    .join("\n");
    (StatusCode::BAD_REQUEST, body)
}

/// Build the full application router: index, health, and the item/image API
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/items", get(items::list_items).post(items::save_item))
        .route("/items/:id", get(items::get_item).delete(items::delete_item))
        .route("/items/:id/images", post(images::upload_image))
        .route(
            "/items/:id/images/:img_id",
            get(images::get_image).delete(images::remove_image),
        );

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
