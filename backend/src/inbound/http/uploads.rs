//! Serves stored pet photos at `GET /uploads/{file}`.

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};

use crate::domain::Error;
use crate::domain::ports::ImageStoreError;

use super::ApiResult;
use super::state::HttpState;

/// Content type for a stored file, guessed from its extension.
fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Stream a stored image.
#[utoipa::path(
    get,
    path = "/uploads/{file}",
    params(("file" = String, Path, description = "Stored image file name")),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 404, description = "No such image")
    ),
    tags = ["uploads"],
    operation_id = "getUpload",
    security([])
)]
#[get("/uploads/{file}")]
pub async fn serve_upload(
    state: web::Data<HttpState>,
    file: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let file = file.into_inner();
    match state.images.read(&file).await {
        Ok(bytes) => Ok(HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, content_type_for(&file)))
            .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
            .body(bytes)),
        Err(ImageStoreError::NotFound { .. } | ImageStoreError::InvalidName { .. }) => {
            Ok(HttpResponse::NotFound().finish())
        }
        Err(err) => Err(Error::internal(err.to_string())),
    }
}
