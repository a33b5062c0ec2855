use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::db::json_store::StoreError;
use crate::services::{
    ai_client::TextGenerator,
    extraction_service::ExtractionService,
    route_service::RouteService,
    upload_service::{UploadError, UploadService},
    user_service::UserService,
    verification_service::{Clock, VerificationCodes},
};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Failed to open data store: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to prepare upload directory: {0}")]
    Upload(#[from] UploadError),
}

/// Shared application state, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub config: AppConfig,
    pub users: UserService,
    pub routes: RouteService,
    pub codes: VerificationCodes,
    pub uploads: UploadService,
    pub extraction: ExtractionService,
    pub ai: Arc<dyn TextGenerator>,
}

impl AppState {
    pub async fn new(
        config: AppConfig,
        ai: Arc<dyn TextGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StartupError> {
        let users = UserService::open(&config.data_dir).await?;
        let routes = RouteService::open(&config.data_dir).await?;
        let uploads = UploadService::open(config.upload_dir.clone()).await?;

        Ok(Self {
            codes: VerificationCodes::new(clock, config.sms_dev_mode),
            extraction: ExtractionService::new(ai.clone()),
            users,
            routes,
            uploads,
            ai,
            config,
        })
    }
}
