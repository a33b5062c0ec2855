use std::{sync::Arc, time::Duration};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use travel_planner_api::{
    config::AppConfig,
    services::{
        ai_client::DashScopeClient,
        verification_service::{SystemClock, SWEEP_INTERVAL_SECS},
    },
    state::AppState,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    log::info!("Application starting...");

    let config = AppConfig::from_env();
    let host = config.host.clone();
    let port = config.port;

    let ai = DashScopeClient::new(&config.ai)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    log::info!(
        "AI client ready: model={}, timeout={}s",
        config.ai.model,
        config.ai.timeout.as_secs()
    );

    let state = AppState::new(config, Arc::new(ai), Arc::new(SystemClock))
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    log::info!(
        "Data directory: {}, uploads: {}",
        state.config.data_dir.display(),
        state.uploads.upload_dir().display()
    );
    let state = web::Data::new(state);

    let sweeper = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let removed = sweeper.codes.purge_expired();
            if removed > 0 {
                log::debug!("Evicted {} expired verification codes", removed);
            }
        }
    });

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let upload_dir = state.uploads.upload_dir().to_path_buf();
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(|cfg| travel_planner_api::configure(cfg, &upload_dir))
    })
    .bind((host, port))?
    .run()
    .await
}
