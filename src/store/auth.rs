//! Authentication collaborator: credential sign-up/sign-in, sign-out and an
//! auth-state channel that yields the current account id or none.

use crate::store::database::Store;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use rand::RngCore;
use sqlx::Row;
use tokio::sync::watch;
use uuid::Uuid;

/// Result of a successful sign-in or sign-up.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub account_id: String,
    pub session_token: String,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    store: Store,
    state: watch::Sender<Option<String>>,
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| anyhow::anyhow!("salt encoding failed: {}", e))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(hash: &str, password: &str) -> bool {
    // The salt is embedded in the stored hash.
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

impl AuthClient {
    pub fn new(store: Store) -> Self {
        let (state, _) = watch::channel(None);
        Self { store, state }
    }

    /// Auth-state-changed subscription; yields the current account id or
    /// none, starting from the value at subscription time.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.state.subscribe()
    }

    pub fn current_account(&self) -> Option<String> {
        self.state.borrow().clone()
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> anyhow::Result<SessionInfo> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            anyhow::bail!("invalid email address");
        }
        if password.len() < 6 {
            anyhow::bail!("password must be at least 6 characters");
        }

        let existing = sqlx::query("SELECT id FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.store.pool)
            .await?;
        if existing.is_some() {
            anyhow::bail!("email already registered");
        }

        let account_id = Uuid::new_v4().to_string();
        let password_hash = hash_password(password)?;
        sqlx::query(
            "INSERT INTO accounts (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&account_id)
        .bind(email)
        .bind(&password_hash)
        .bind(Utc::now().timestamp())
        .execute(&self.store.pool)
        .await?;

        log::info!("account created for {}", email);
        self.open_session(account_id).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<SessionInfo> {
        let row = sqlx::query("SELECT id, password_hash FROM accounts WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(&self.store.pool)
            .await?;
        let Some(row) = row else {
            anyhow::bail!("unknown email or wrong password");
        };
        let hash: String = row.get("password_hash");
        if !verify_password(&hash, password) {
            anyhow::bail!("unknown email or wrong password");
        }

        let account_id: String = row.get("id");
        self.open_session(account_id).await
    }

    /// Signs out the current account: all its sessions are invalidated and
    /// the auth-state channel flips to none.
    pub async fn sign_out(&self) -> anyhow::Result<()> {
        if let Some(account_id) = self.current_account() {
            sqlx::query("DELETE FROM sessions WHERE account_id = ?")
                .bind(&account_id)
                .execute(&self.store.pool)
                .await?;
            log::info!("signed out account {}", account_id);
        }
        self.state.send_replace(None);
        Ok(())
    }

    /// Restores a persisted session token, if it still names a live session.
    pub async fn resume(&self, session_token: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT account_id FROM sessions WHERE session_token = ?")
            .bind(session_token)
            .fetch_optional(&self.store.pool)
            .await?;
        match row {
            Some(row) => {
                let account_id: String = row.get("account_id");
                self.state.send_replace(Some(account_id.clone()));
                Ok(Some(account_id))
            }
            None => Ok(None),
        }
    }

    async fn open_session(&self, account_id: String) -> anyhow::Result<SessionInfo> {
        let session_token = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO sessions (session_token, account_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(&session_token)
        .bind(&account_id)
        .bind(Utc::now().timestamp())
        .execute(&self.store.pool)
        .await?;

        self.state.send_replace(Some(account_id.clone()));
        Ok(SessionInfo {
            account_id,
            session_token,
        })
    }
}
