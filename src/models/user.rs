use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SIGNATURE: &str = "这个人很懒，什么都没留下~";
const AVATAR_SEED_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub stats: UserStats,
    #[serde(default)]
    pub collections: Vec<CollectedRoute>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login_at: DateTime<Utc>,
}

impl User {
    /// A fresh account for `phone` with the default nickname and avatar.
    pub fn new(id: String, phone: &str) -> Self {
        let now = Utc::now();
        let tail: String = phone
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        Self {
            id,
            phone: phone.to_string(),
            nickname: format!("旅行者{}", tail),
            avatar: format!("{}{}", AVATAR_SEED_URL, phone),
            gender: default_gender(),
            signature: DEFAULT_SIGNATURE.to_string(),
            preferences: Vec::new(),
            stats: UserStats::default(),
            collections: Vec::new(),
            created_at: now,
            last_login_at: now,
        }
    }

    /// Merges the fields present in `update`, leaving the rest untouched.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(nickname) = update.nickname {
            self.nickname = nickname;
        }
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(signature) = update.signature {
            self.signature = signature;
        }
        if let Some(preferences) = update.preferences {
            self.preferences = preferences;
        }
    }
}

fn default_gender() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserStats {
    pub published_count: u32,
    pub collected_count: u32,
    pub extract_count: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedRoute {
    pub route_id: String,
    pub collected_at: DateTime<Utc>,
}

/// Body of `PUT /api/users/profile`. Absent fields are left as they are.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub gender: Option<String>,
    pub signature: Option<String>,
    pub preferences: Option<Vec<String>>,
}

/// The user summary returned from a login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    #[serde(rename = "_id")]
    pub id: String,
    pub phone: String,
    pub nickname: String,
    pub avatar: String,
    pub is_new_user: bool,
}
