pub mod ai;
pub mod auth;
pub mod douyin;
pub mod health;
pub mod route;
pub mod upload;
pub mod users;
