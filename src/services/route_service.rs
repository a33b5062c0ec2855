use std::path::Path;

use chrono::Utc;

use crate::db::json_store::{generate_id, JsonCollection, StoreError};
use crate::models::route::{PublishRoute, Route, RouteAuthor};

pub const ROUTES_FILE: &str = "routes.json";

/// Published routes kept in `routes.json`, newest first.
pub struct RouteService {
    routes: JsonCollection<Route>,
}

impl RouteService {
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            routes: JsonCollection::open(data_dir.join(ROUTES_FILE)).await?,
        })
    }

    pub async fn all(&self) -> Result<Vec<Route>, StoreError> {
        self.routes.load().await
    }

    /// Stores a new route ahead of all existing ones.
    ///
    /// `destination` and `title` must already be validated as present.
    pub async fn create(
        &self,
        user_id: &str,
        author: RouteAuthor,
        input: PublishRoute,
    ) -> Result<Route, StoreError> {
        let route = Route {
            id: generate_id("route"),
            user_id: user_id.to_string(),
            author,
            destination: input.destination.unwrap_or_default(),
            title: input.title.unwrap_or_default(),
            content: input.content,
            days: input.days,
            budget: input.budget,
            tags: input.tags.unwrap_or_default(),
            is_public: input.is_public.unwrap_or(true),
            images: input.images.unwrap_or_default(),
            likes: 0,
            views: 0,
            created_at: Utc::now(),
        };
        let created = route.clone();

        self.routes
            .update(move |routes| {
                routes.insert(0, route);
                ((), true)
            })
            .await?;

        Ok(created)
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Route>, StoreError> {
        Ok(self
            .routes
            .load()
            .await?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect())
    }

    /// Removes the route only if `user_id` owns it. Returns whether a route
    /// was removed.
    pub async fn delete(&self, route_id: &str, user_id: &str) -> Result<bool, StoreError> {
        self.routes
            .update(|routes| {
                let before = routes.len();
                routes.retain(|r| !(r.id == route_id && r.user_id == user_id));
                let removed = routes.len() < before;
                (removed, removed)
            })
            .await
    }
}
