use actix_web::HttpResponse;
use chrono::Utc;
use serde_json::json;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "✅ 旅游攻略App后端运行正常",
        "version": VERSION,
        "storage": "本地JSON文件",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok", "version": VERSION }))
}

pub async fn api_test() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "message": "后端API连接成功" }))
}
