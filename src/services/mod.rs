pub mod ai_client;
pub mod default_plan;
pub mod extraction_service;
pub mod itinerary_generator;
pub mod json_extract;
pub mod link_classifier;
pub mod route_service;
pub mod upload_service;
pub mod user_service;
pub mod verification_service;
