use carematch::common::config::ClientConfig;
use carematch::store::Store;
use sqlx::Row;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env();
    println!("Connecting to {}", config.database_url);
    let store = Store::connect(&config.database_url).await?;

    println!("\n-- accounts --");
    let rows = sqlx::query("SELECT id, email, created_at FROM accounts ORDER BY created_at")
        .fetch_all(&store.pool)
        .await?;
    for r in rows.iter() {
        let id: String = r.try_get("id").unwrap_or_default();
        let email: String = r.try_get("email").unwrap_or_default();
        let created_at: i64 = r.try_get("created_at").unwrap_or(0);
        println!("id={} email={} created_at={}", id, email, created_at);
    }

    println!("\n-- profiles --");
    let rows = sqlx::query("SELECT id, name, role, location, rating, tags FROM profiles ORDER BY id")
        .fetch_all(&store.pool)
        .await?;
    for r in rows.iter() {
        let id: String = r.try_get("id").unwrap_or_default();
        let name: String = r.try_get("name").unwrap_or_default();
        let role: String = r.try_get("role").unwrap_or_default();
        let location: String = r.try_get("location").unwrap_or_default();
        let rating: f64 = r.try_get("rating").unwrap_or(0.0);
        let tags: String = r.try_get("tags").unwrap_or_default();
        println!(
            "id={} name={} role={} location={} rating={} tags={}",
            id, name, role, location, rating, tags
        );
    }

    println!("\n-- swipes (last 20) --");
    let rows = sqlx::query(
        "SELECT from_user_id, to_user_id, liked, timestamp FROM swipes ORDER BY timestamp DESC LIMIT 20",
    )
    .fetch_all(&store.pool)
    .await?;
    for r in rows.iter() {
        let from_user_id: String = r.try_get("from_user_id").unwrap_or_default();
        let to_user_id: String = r.try_get("to_user_id").unwrap_or_default();
        let liked: bool = r.try_get("liked").unwrap_or(false);
        let timestamp: i64 = r.try_get("timestamp").unwrap_or(0);
        println!(
            "from={} to={} liked={} timestamp={}",
            from_user_id, to_user_id, liked, timestamp
        );
    }

    println!("\n-- matches --");
    let rows = sqlx::query("SELECT id, user_a, user_b, timestamp FROM matches ORDER BY timestamp")
        .fetch_all(&store.pool)
        .await?;
    for r in rows.iter() {
        let id: String = r.try_get("id").unwrap_or_default();
        let user_a: String = r.try_get("user_a").unwrap_or_default();
        let user_b: String = r.try_get("user_b").unwrap_or_default();
        let timestamp: i64 = r.try_get("timestamp").unwrap_or(0);
        println!("id={} user_a={} user_b={} timestamp={}", id, user_a, user_b, timestamp);
    }

    println!("\n-- sessions --");
    let rows = sqlx::query("SELECT session_token, account_id, created_at FROM sessions")
        .fetch_all(&store.pool)
        .await?;
    for r in rows.iter() {
        let token: String = r.try_get("session_token").unwrap_or_default();
        let account_id: String = r.try_get("account_id").unwrap_or_default();
        let created_at: i64 = r.try_get("created_at").unwrap_or(0);
        println!(
            "token={}... account_id={} created_at={}",
            &token[..token.len().min(8)],
            account_id,
            created_at
        );
    }

    Ok(())
}
