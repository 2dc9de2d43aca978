use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::JsonApiError;
use crate::routes::items::SaveItemResponse;
use crate::startup::ServerState;

/// Serve raw image bytes. Unknown `(item, image)` pairs are a 404.
pub async fn get_image(
    State(state): State<ServerState>,
    Path((id, img_id)): Path<(String, String)>,
) -> Result<Vec<u8>, JsonApiError> {
    match state.items.get_image(&id, &img_id).await {
        Ok(Some(bytes)) => Ok(bytes),
        Ok(None) => Err(JsonApiError::new(StatusCode::NOT_FOUND, "not found", "Failed to load image")),
        Err(e) => Err(JsonApiError::from_service(e, "Failed to load image")),
    }
}

/// Accept a multipart upload (field `image`) and attach it to the item.
pub async fn upload_image(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<SaveItemResponse>, JsonApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, e.to_string(), "Malformed multipart body"))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().map(str::to_owned).ok_or_else(|| {
            JsonApiError::new(
                StatusCode::BAD_REQUEST,
                "missing filename",
                "Field `image` carries no filename",
            )
        })?;
        let bytes = field.bytes().await.map_err(|e| {
            JsonApiError::new(StatusCode::BAD_REQUEST, e.to_string(), "Failed to read upload")
        })?;

        return state
            .items
            .upload_image(&id, &filename, &bytes)
            .await
            .map(|id| Json(SaveItemResponse { id }))
            .map_err(|e| JsonApiError::from_service(e, "Failed to save image"));
    }

    Err(JsonApiError::new(
        StatusCode::BAD_REQUEST,
        "missing field",
        "Multipart field `image` is required",
    ))
}

/// Detach an image reference and delete its file.
pub async fn remove_image(
    State(state): State<ServerState>,
    Path((id, img_id)): Path<(String, String)>,
) -> Result<Json<SaveItemResponse>, JsonApiError> {
    state
        .items
        .remove_image(&id, &img_id)
        .await
        .map(|id| Json(SaveItemResponse { id }))
        .map_err(|e| JsonApiError::from_service(e, "Failed to delete image"))
}
