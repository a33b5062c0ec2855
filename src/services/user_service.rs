use std::path::Path;

use chrono::Utc;

use crate::db::json_store::{generate_id, JsonCollection, StoreError};
use crate::models::user::{ProfileUpdate, User};

pub const USERS_FILE: &str = "users.json";

/// User records kept in `users.json`.
pub struct UserService {
    users: JsonCollection<User>,
}

impl UserService {
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            users: JsonCollection::open(data_dir.join(USERS_FILE)).await?,
        })
    }

    pub async fn all(&self) -> Result<Vec<User>, StoreError> {
        self.users.load().await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.load().await?.into_iter().find(|u| u.id == id))
    }

    /// Finds the account for `phone`, creating it on first login. The flag
    /// is `true` for a newly created account.
    ///
    /// Lookup and insert happen under one write, so two simultaneous first
    /// logins cannot create duplicate accounts.
    pub async fn find_or_create(&self, phone: &str) -> Result<(User, bool), StoreError> {
        self.users
            .update(|users| {
                let now = Utc::now();
                if let Some(existing) = users.iter_mut().find(|u| u.phone == phone) {
                    existing.last_login_at = now;
                    return ((existing.clone(), false), true);
                }

                let user = User::new(generate_id("user"), phone);
                users.push(user.clone());
                ((user, true), true)
            })
            .await
    }

    /// Merges `update` into the user's record; `None` when the id is unknown.
    pub async fn update_profile(
        &self,
        id: &str,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        self.users
            .update(|users| match users.iter_mut().find(|u| u.id == id) {
                Some(user) => {
                    user.apply(update);
                    (Some(user.clone()), true)
                }
                None => (None, false),
            })
            .await
    }
}
