use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tokio::sync::broadcast;

/// The collections held by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Profiles,
    Swipes,
    Matches,
}

/// Embedded document store backing the auth and match collections.
///
/// Plays the role of the hosted backend: flat collections keyed by an
/// opaque document id, plus a change channel that live subscriptions use
/// to re-run their queries.
#[derive(Debug, Clone)]
pub struct Store {
    pub pool: SqlitePool,
    changes: broadcast::Sender<Collection>,
}

impl Store {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        log::debug!("connecting to store at {}", database_url);

        // In-memory databases exist per connection, so the pool must not
        // hand out more than one.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        // Create the parent directory for file-backed databases.
        if let Some(file_path) = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .filter(|p| !p.contains(":memory:"))
        {
            let file_path = file_path.split('?').next().unwrap_or(file_path);
            if let Some(parent) = std::path::Path::new(file_path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let (changes, _) = broadcast::channel(64);
        let store = Self { pool, changes };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), sqlx::Error> {
        // Accounts and sessions (auth collaborator)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                session_token TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        // Profiles, keyed by account id
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                photo TEXT NOT NULL,
                location TEXT NOT NULL,
                bio TEXT NOT NULL,
                tags TEXT NOT NULL,
                rating REAL NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        // Swipes: one row per ordered pair, last write wins
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS swipes (
                from_user_id TEXT NOT NULL,
                to_user_id TEXT NOT NULL,
                liked INTEGER NOT NULL,
                timestamp INTEGER NOT NULL,
                UNIQUE(from_user_id, to_user_id)
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        // Matches: canonical sorted pair, at most one per couple
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS matches (
                id TEXT PRIMARY KEY,
                user_a TEXT NOT NULL,
                user_b TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                last_message TEXT NOT NULL DEFAULT '',
                last_message_timestamp INTEGER,
                UNIQUE(user_a, user_b)
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Announce that a collection changed. Subscriptions re-run their query
    /// on the next announcement; no receivers is not an error.
    pub(crate) fn notify(&self, collection: Collection) {
        let _ = self.changes.send(collection);
    }

    pub(crate) fn change_feed(&self) -> broadcast::Receiver<Collection> {
        self.changes.subscribe()
    }
}
