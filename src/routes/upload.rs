use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::{error::ApiError, services::upload_service::UploadError, state::AppState};

pub async fn upload(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let stored = state
        .uploads
        .save_avatar(payload)
        .await
        .map_err(|err| match err {
            UploadError::MultipartError(_) => {
                log::info!("Rejected upload: {}", err);
                ApiError::bad_request("请选择文件")
            }
            UploadError::StorageError(_) => {
                log::error!("Upload failed: {}", err);
                ApiError::internal("上传失败")
            }
        })?;

    let Some(file_name) = stored else {
        return Err(ApiError::bad_request("请选择文件"));
    };

    // Echo the caller's Host so the URL resolves from wherever the client is.
    let url = format!(
        "http://{}/uploads/{}",
        req.connection_info().host(),
        file_name
    );
    log::info!("Image uploaded: {}", url);

    Ok(HttpResponse::Ok().json(json!({ "success": true, "url": url })))
}
