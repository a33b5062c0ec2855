use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use log::{info, warn};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 5000;
const DEFAULT_JWT_SECRET: &str = "default-secret-key";
const DEFAULT_AI_BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1";
const DEFAULT_AI_MODEL: &str = "qwen-turbo";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub ai: AiConfig,
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    /// Issue the fixed code `123456` instead of a random one.
    pub sms_dev_mode: bool,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, falling back to the built-in default secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        let api_key = env::var("BAILIAN_API_KEY").unwrap_or_else(|_| {
            warn!("BAILIAN_API_KEY not set, travel plans will use the fallback templates");
            String::new()
        });

        let sms_dev_mode = env::var("SMS_DEV_MODE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
            || env::var("NODE_ENV").map(|v| v == "development").unwrap_or(false);

        Self {
            host: env::var("HOST").unwrap_or_else(|_| HOST.to_string()),
            port: try_load("PORT", PORT),
            jwt_secret,
            ai: AiConfig {
                api_key,
                base_url: env::var("AI_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_AI_BASE_URL.to_string()),
                model: env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
                timeout: Duration::from_secs(try_load("AI_TIMEOUT_SECS", DEFAULT_AI_TIMEOUT_SECS)),
            },
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()).into(),
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            sms_dev_mode,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            ai: AiConfig::default(),
            data_dir: PathBuf::from("data"),
            upload_dir: PathBuf::from("uploads"),
            sms_dev_mode: false,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
