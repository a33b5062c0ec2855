use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub link: String,
}

/// Always answers 200: AI failures are replaced by a preset plan.
pub async fn extract(state: web::Data<AppState>, input: web::Json<ExtractRequest>) -> HttpResponse {
    let link = input.into_inner().link;
    log::info!("Extract request for link: {}", link);

    let response = state.extraction.extract(&link).await;
    if let Some(error) = &response.error {
        log::warn!("Extract for {} served a preset plan: {}", link, error);
    }

    HttpResponse::Ok().json(response)
}
