use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    error::ApiError, middleware::auth_context::AuthenticatedUser, models::user::ProfileUpdate,
    state::AppState,
};

pub async fn get_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let profile = state
        .users
        .find_by_id(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("用户不存在"))?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": profile })))
}

pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    input: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, ApiError> {
    let profile = state
        .users
        .update_profile(&user.user_id, input.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("用户不存在"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "更新成功",
        "data": profile,
    })))
}
