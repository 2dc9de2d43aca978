use axum::{
    extract::{Path, State},
    Json,
};
use models::{Item, ItemFields};
use serde::{Deserialize, Serialize};

use crate::errors::JsonApiError;
use crate::startup::ServerState;

/// Save body: an optional id plus the replace document. Fields omitted here
/// are cleared on the stored record.
#[derive(Debug, Deserialize)]
pub struct SaveItemRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveItemResponse {
    pub id: String,
}

/// Delete responses keep the `_id` key; it is part of the wire contract.
#[derive(Debug, Serialize)]
pub struct DeleteItemResponse {
    #[serde(rename = "_id")]
    pub id: String,
}

pub async fn list_items(
    State(state): State<ServerState>,
) -> Result<Json<Vec<Item>>, JsonApiError> {
    state
        .items
        .list()
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, "Failed to load items"))
}

/// Fetch one item. A missing id serializes as a JSON `null` body with 200,
/// not a 404, so callers cannot tell absence from an empty record.
pub async fn get_item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Item>>, JsonApiError> {
    state
        .items
        .get(&id)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, "Failed to load item"))
}

pub async fn save_item(
    State(state): State<ServerState>,
    Json(body): Json<SaveItemRequest>,
) -> Result<Json<SaveItemResponse>, JsonApiError> {
    let fields = ItemFields { name: body.name, value: body.value, images: body.images };
    state
        .items
        .save(body.id, fields)
        .await
        .map(|id| Json(SaveItemResponse { id }))
        .map_err(|e| JsonApiError::from_service(e, "Failed to save item"))
}

pub async fn delete_item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteItemResponse>, JsonApiError> {
    state
        .items
        .delete(&id)
        .await
        .map(|id| Json(DeleteItemResponse { id }))
        .map_err(|e| JsonApiError::from_service(e, "Failed to delete item"))
}
