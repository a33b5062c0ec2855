pub mod auth;
pub mod route;
pub mod travel_plan;
pub mod user;
