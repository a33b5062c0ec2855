#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::{web, App};
use async_trait::async_trait;
use tempfile::TempDir;

use travel_planner_api::config::AppConfig;
use travel_planner_api::middleware::auth::issue_token;
use travel_planner_api::models::user::User;
use travel_planner_api::services::ai_client::{
    AiError, Completion, GenerationRequest, TextGenerator, TokenUsage,
};
use travel_planner_api::services::verification_service::SystemClock;
use travel_planner_api::state::AppState;

pub const TEST_SECRET: &str = "test-secret";
pub const TOKENS_PER_CALL: u64 = 100;

/// Replays canned model replies in order; `Err` entries simulate a failed call.
/// Once the script runs out every call fails.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn model(&self) -> &str {
        "test-model"
    }

    async fn generate(&self, _request: GenerationRequest) -> Result<Completion, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(Completion {
                content,
                usage: TokenUsage {
                    input_tokens: TOKENS_PER_CALL / 2,
                    output_tokens: TOKENS_PER_CALL / 2,
                    total_tokens: TOKENS_PER_CALL,
                },
            }),
            Some(Err(message)) => Err(AiError::Config(message)),
            None => Err(AiError::Config("script exhausted".to_string())),
        }
    }
}

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub generator: Arc<ScriptedGenerator>,
    // Keeps the data and upload directories alive for the test's duration.
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_generator(ScriptedGenerator::failing()).await
    }

    pub async fn with_generator(generator: Arc<ScriptedGenerator>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            jwt_secret: TEST_SECRET.to_string(),
            data_dir: dir.path().join("data"),
            upload_dir: dir.path().join("uploads"),
            sms_dev_mode: true,
            ..AppConfig::default()
        };

        let state = AppState::new(config, generator.clone(), Arc::new(SystemClock))
            .await
            .unwrap();

        Self {
            state: web::Data::new(state),
            generator,
            _dir: dir,
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let upload_dir = self.state.uploads.upload_dir().to_path_buf();
        App::new()
            .app_data(self.state.clone())
            .configure(|cfg| travel_planner_api::configure(cfg, &upload_dir))
    }

    /// Creates (or finds) the account for `phone` and returns a bearer header value.
    pub async fn login_as(&self, phone: &str) -> (User, String) {
        let (user, _) = self.state.users.find_or_create(phone).await.unwrap();
        let token = issue_token(&user.id, TEST_SECRET).unwrap();
        (user, format!("Bearer {}", token))
    }
}

/// A reply the classifier accepts, wrapped the way models tend to answer.
pub fn classifier_reply(destination: &str) -> String {
    format!(
        "好的，分析如下：\n```json\n{{\"destination\": \"{}\", \"keywords\": [\"美食\", \"古镇\"], \"suggestedDays\": \"3天\"}}\n```",
        destination
    )
}

/// A minimal itinerary the generator accepts.
pub fn plan_reply(destination: &str) -> String {
    serde_json::json!({
        "destination": destination,
        "duration": "3天2晚",
        "budget": "1500元/人",
        "bestSeason": "春秋",
        "summary": "测试攻略",
        "dailyPlan": [{
            "day": 1,
            "theme": "初到",
            "activities": [{
                "time": "09:00",
                "place": "古城",
                "description": "散步",
                "duration": "2小时",
                "cost": "免费"
            }],
            "meals": { "breakfast": "米线", "lunch": "火锅", "dinner": "烧烤" }
        }],
        "tips": ["带伞"]
    })
    .to_string()
}
