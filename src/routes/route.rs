use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthenticatedUser,
    models::route::{PublishRoute, RouteAuthor},
    state::AppState,
};

pub async fn publish(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    input: web::Json<PublishRoute>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let is_blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());
    if is_blank(&input.destination) || is_blank(&input.title) {
        return Err(ApiError::bad_request("信息不完整"));
    }

    let author = state
        .users
        .find_by_id(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("用户不存在"))?;

    let route = state
        .routes
        .create(
            &user.user_id,
            RouteAuthor {
                nickname: author.nickname,
                avatar: author.avatar,
            },
            input,
        )
        .await?;
    log::info!("User {} published route {}", user.user_id, route.id);

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": route })))
}

pub async fn my_published(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let routes = state.routes.list_by_user(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": routes })))
}

pub async fn delete(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let route_id = path.into_inner();

    if !state.routes.delete(&route_id, &user.user_id).await? {
        return Err(ApiError::not_found("删除失败: 路线不存在或无权删除"));
    }

    log::info!("User {} deleted route {}", user.user_id, route_id);
    Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "删除成功" })))
}
