use std::env;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub database_url: String,
    pub log_level: String,
    /// Base URL used to seed the default profile photo for new accounts.
    pub photo_base_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/carematch.db".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            photo_base_url: env::var("PHOTO_BASE_URL")
                .unwrap_or_else(|_| "https://picsum.photos/seed".to_string()),
        }
    }
}
