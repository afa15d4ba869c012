pub mod chat_service;
pub mod match_service;
pub mod profile_service;
