pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use std::path::Path;

use actix_files::Files;
use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::{error::ApiError, middleware::auth::AuthMiddleware};

/// Registers every route. `AppState` must already be registered as app data.
pub fn configure(cfg: &mut web::ServiceConfig, upload_dir: &Path) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/", web::get().to(routes::health::root))
        .route("/health", web::get().to(routes::health::health_check))
        .service(Files::new("/uploads", upload_dir.to_path_buf()))
        .service(
            web::scope("/api")
                .route("/test", web::get().to(routes::health::api_test))
                .route("/upload", web::post().to(routes::upload::upload))
                .route("/douyin/extract", web::post().to(routes::douyin::extract))
                .route("/ai/test", web::post().to(routes::ai::ai_test))
                .service(
                    web::scope("/auth")
                        .route("/send-code", web::post().to(routes::auth::send_code))
                        .route("/login", web::post().to(routes::auth::login))
                        // Protected routes
                        .service(
                            web::scope("")
                                .wrap(AuthMiddleware)
                                .route("/test", web::get().to(routes::auth::auth_test)),
                        ),
                )
                .service(
                    web::scope("/users").wrap(AuthMiddleware).service(
                        web::resource("/profile")
                            .route(web::get().to(routes::users::get_profile))
                            .route(web::put().to(routes::users::update_profile)),
                    ),
                )
                .service(
                    web::scope("/routes")
                        .wrap(AuthMiddleware)
                        .route("/publish", web::post().to(routes::route::publish))
                        .route("/my-published", web::get().to(routes::route::my_published))
                        .route("/{id}", web::delete().to(routes::route::delete)),
                ),
        );
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::info!("Rejected request body: {}", err);
    ApiError::bad_request(format!("请求格式错误: {}", err)).into()
}
