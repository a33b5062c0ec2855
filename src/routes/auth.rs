use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    error::ApiError,
    middleware::{auth::issue_token, auth_context::AuthenticatedUser},
    models::{
        auth::{LoginData, LoginRequest, SendCodeRequest},
        user::UserSession,
    },
    services::verification_service::CODE_TTL_SECS,
    state::AppState,
};

pub async fn send_code(
    state: web::Data<AppState>,
    input: web::Json<SendCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    let phone = input.into_inner().phone;
    if !is_valid_phone(&phone) {
        return Err(ApiError::bad_request("手机号格式不正确"));
    }

    let code = state.codes.issue(&phone);
    // No SMS gateway: the code is delivered through the log.
    log::info!("Verification code for {}: {}", phone, code);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "验证码已发送",
        "expiresIn": CODE_TTL_SECS,
    })))
}

pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let LoginRequest { phone, code } = input.into_inner();

    state
        .codes
        .verify(&phone, &code)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    let (user, is_new_user) = state.users.find_or_create(&phone).await?;
    if is_new_user {
        log::info!("Registered user {} for {}", user.id, phone);
    }

    let token = issue_token(&user.id, &state.config.jwt_secret).map_err(|err| {
        log::error!("Failed to sign token for {}: {}", user.id, err);
        ApiError::internal("登录失败，请稍后重试")
    })?;

    let data = LoginData {
        token,
        user: UserSession {
            id: user.id,
            phone: user.phone,
            nickname: user.nickname,
            avatar: user.avatar,
            is_new_user,
        },
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": if is_new_user { "注册成功" } else { "登录成功" },
        "data": data,
    })))
}

pub async fn auth_test(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "认证成功",
        "userId": user.user_id,
    }))
}

fn is_valid_phone(phone: &str) -> bool {
    regex::Regex::new(r"^1[3-9]\d{9}$").is_ok_and(|re| re.is_match(phone))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("13800138000"));
        assert!(is_valid_phone("19912345678"));
        assert!(!is_valid_phone("12800138000"));
        assert!(!is_valid_phone("1380013800"));
        assert!(!is_valid_phone("138001380001"));
        assert!(!is_valid_phone("+8613800138000"));
        assert!(!is_valid_phone(""));
    }
}
