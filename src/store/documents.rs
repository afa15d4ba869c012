//! Typed collection operations. Every row is decoded into a strongly-typed
//! record at this boundary; rows that fail to decode are reported as errors
//! instead of being passed through half-read.

use crate::common::models::{Match, Profile, Swipe, UserRole};
use crate::store::database::{Collection, Store};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

fn decode_profile(row: &SqliteRow) -> anyhow::Result<Profile> {
    let role: String = row.get("role");
    let tags: String = row.get("tags");
    Ok(Profile {
        id: row.get("id"),
        name: row.get("name"),
        role: UserRole::from_str(&role)?,
        photo: row.get("photo"),
        location: row.get("location"),
        bio: row.get("bio"),
        tags: serde_json::from_str(&tags)
            .map_err(|e| anyhow::anyhow!("bad tags column: {}", e))?,
        rating: row.get("rating"),
    })
}

fn decode_swipe(row: &SqliteRow) -> anyhow::Result<Swipe> {
    let ts: i64 = row.get("timestamp");
    Ok(Swipe {
        from_user_id: row.get("from_user_id"),
        to_user_id: row.get("to_user_id"),
        liked: row.get::<i64, _>("liked") != 0,
        timestamp: DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| anyhow::anyhow!("bad swipe timestamp: {}", ts))?,
    })
}

fn decode_match(row: &SqliteRow) -> anyhow::Result<Match> {
    let ts: i64 = row.get("timestamp");
    let last_ts: Option<i64> = row.get("last_message_timestamp");
    Ok(Match {
        id: row.get("id"),
        users: [row.get("user_a"), row.get("user_b")],
        timestamp: DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| anyhow::anyhow!("bad match timestamp: {}", ts))?,
        last_message: row.get("last_message"),
        last_message_timestamp: last_ts.and_then(|t| DateTime::from_timestamp(t, 0)),
    })
}

impl Store {
    // ---- profiles ----

    pub async fn get_profile(&self, id: &str) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query("SELECT * FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(decode_profile).transpose()
    }

    /// Full-document overwrite, keyed by the account id.
    pub async fn set_profile(&self, profile: &Profile) -> anyhow::Result<()> {
        let tags = serde_json::to_string(&profile.tags)?;
        sqlx::query(
            r#"INSERT OR REPLACE INTO profiles
               (id, name, role, photo, location, bio, tags, rating)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(profile.role.to_string())
        .bind(&profile.photo)
        .bind(&profile.location)
        .bind(&profile.bio)
        .bind(tags)
        .bind(profile.rating)
        .execute(&self.pool)
        .await?;
        self.notify(Collection::Profiles);
        Ok(())
    }

    pub async fn list_profiles(&self) -> anyhow::Result<Vec<Profile>> {
        let rows = sqlx::query("SELECT * FROM profiles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_profile).collect()
    }

    // ---- swipes ----

    /// Records a swipe. Re-swiping the same ordered pair replaces the
    /// previous decision (last write wins).
    pub async fn upsert_swipe(&self, swipe: &Swipe) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO swipes (from_user_id, to_user_id, liked, timestamp)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(from_user_id, to_user_id)
               DO UPDATE SET liked = excluded.liked, timestamp = excluded.timestamp"#,
        )
        .bind(&swipe.from_user_id)
        .bind(&swipe.to_user_id)
        .bind(i64::from(swipe.liked))
        .bind(swipe.timestamp.timestamp())
        .execute(&self.pool)
        .await?;
        self.notify(Collection::Swipes);
        Ok(())
    }

    pub async fn swipes_from(&self, from_user_id: &str) -> anyhow::Result<Vec<Swipe>> {
        let rows = sqlx::query("SELECT * FROM swipes WHERE from_user_id = ?")
            .bind(from_user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_swipe).collect()
    }

    /// True iff a `liked = true` swipe from `from_user_id` to `to_user_id`
    /// exists.
    pub async fn liked_swipe_exists(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> anyhow::Result<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM swipes WHERE from_user_id = ? AND to_user_id = ? AND liked = 1",
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    // ---- matches ----

    /// Inserts a match for the pair unless one already exists. Returns the
    /// new record, or `None` when the pair was already matched.
    pub async fn insert_match(&self, a: &str, b: &str) -> anyhow::Result<Option<Match>> {
        let (user_a, user_b) = Match::canonical_pair(a, b);
        let existing = sqlx::query("SELECT 1 FROM matches WHERE user_a = ? AND user_b = ?")
            .bind(&user_a)
            .bind(&user_b)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Ok(None);
        }

        let record = Match {
            id: Uuid::new_v4().to_string(),
            users: [user_a, user_b],
            timestamp: Utc::now(),
            last_message: String::new(),
            last_message_timestamp: None,
        };
        sqlx::query(
            r#"INSERT OR IGNORE INTO matches
               (id, user_a, user_b, timestamp, last_message, last_message_timestamp)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&record.id)
        .bind(&record.users[0])
        .bind(&record.users[1])
        .bind(record.timestamp.timestamp())
        .bind(&record.last_message)
        .bind(record.last_message_timestamp.map(|t| t.timestamp()))
        .execute(&self.pool)
        .await?;
        self.notify(Collection::Matches);
        Ok(Some(record))
    }

    /// All matches whose pair contains `user_id`.
    pub async fn matches_for(&self, user_id: &str) -> anyhow::Result<Vec<Match>> {
        let rows = sqlx::query(
            "SELECT * FROM matches WHERE user_a = ? OR user_b = ? ORDER BY timestamp",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(decode_match).collect()
    }
}
