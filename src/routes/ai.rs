use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::ApiError,
    services::ai_client::{ChatMessage, GenerationRequest},
    state::AppState,
};

const DEFAULT_PROBE_MESSAGE: &str = "你好，请介绍一下大理";

#[derive(Debug, Deserialize)]
pub struct AiTestRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Sends one user message straight to the model, without any fallback.
pub async fn ai_test(
    state: web::Data<AppState>,
    input: web::Json<AiTestRequest>,
) -> Result<HttpResponse, ApiError> {
    let message = input
        .into_inner()
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PROBE_MESSAGE.to_string());

    let request = GenerationRequest {
        messages: vec![ChatMessage::user(message)],
        ..Default::default()
    };

    let completion = state.ai.generate(request).await.map_err(|err| {
        log::error!("AI probe failed: {}", err);
        ApiError::internal(err.to_string())
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": completion.content,
        "usage": completion.usage,
    })))
}
