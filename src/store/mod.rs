pub mod auth;
pub mod database;
pub mod documents;
pub mod live;

pub use auth::AuthClient;
pub use database::{Collection, Store};
pub use live::MatchSubscription;
