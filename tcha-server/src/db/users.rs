//! User account and session database operations
//!
//! Only token digests are stored; the raw bearer token never reaches the
//! database.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tcha_common::db::{User, UserUpdate};
use tcha_common::time;
use tcha_common::{Error, Result};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, username, display_name, bio, avatar, is_premium, \
                            followers_count, following_count, country, created_at";

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        display_name: row.get("display_name"),
        bio: row.get("bio"),
        avatar: row.get("avatar"),
        is_premium: row.get("is_premium"),
        followers_count: row.get("followers_count"),
        following_count: row.get("following_count"),
        country: row.get("country"),
        created_at: row.get("created_at"),
    }
}

/// Stored password material for a login attempt
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: String,
    /// Argon2 PHC string, salt included
    pub password_hash: String,
}

pub async fn insert_user(
    pool: &SqlitePool,
    email: &str,
    username: &str,
    display_name: &str,
    password_hash: &str,
) -> Result<User> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        username: username.to_string(),
        display_name: display_name.to_string(),
        bio: String::new(),
        avatar: None,
        is_premium: false,
        followers_count: 0,
        following_count: 0,
        country: None,
        created_at: time::timestamp(),
    };

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO users (
            id, email, username, display_name, bio, is_premium, followers_count,
            following_count, password_hash, created_at
        ) VALUES (?, ?, ?, ?, '', 0, 0, 0, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.display_name)
    .bind(password_hash)
    .bind(&user.created_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::Conflict(format!("Email {} is already registered", email)));
    }
    Ok(user)
}

pub async fn load_user(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    Ok(row.as_ref().map(user_from_row))
}

pub async fn update_user(pool: &SqlitePool, id: &str, update: &UserUpdate) -> Result<Option<User>> {
    sqlx::query(
        r#"
        UPDATE users SET
            username = COALESCE(?, username),
            display_name = COALESCE(?, display_name),
            bio = COALESCE(?, bio),
            avatar = COALESCE(?, avatar),
            country = COALESCE(?, country)
        WHERE id = ?
        "#,
    )
    .bind(&update.username)
    .bind(&update.display_name)
    .bind(&update.bio)
    .bind(&update.avatar)
    .bind(&update.country)
    .bind(id)
    .execute(pool)
    .await?;

    load_user(pool, id).await
}

pub async fn load_credentials(pool: &SqlitePool, email: &str) -> Result<Option<Credentials>> {
    let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| Credentials {
        user_id: row.get("id"),
        password_hash: row.get("password_hash"),
    }))
}

pub async fn insert_session(
    pool: &SqlitePool,
    token_hash: &str,
    user_id: &str,
    expires_at: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(token_hash)
    .bind(user_id)
    .bind(time::timestamp())
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// User id of an unexpired session
pub async fn load_session_user(
    pool: &SqlitePool,
    token_hash: &str,
    now: &str,
) -> Result<Option<String>> {
    let user_id: Option<String> = sqlx::query_scalar(
        "SELECT user_id FROM sessions WHERE token_hash = ? AND expires_at > ?",
    )
    .bind(token_hash)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(user_id)
}

pub async fn delete_session(pool: &SqlitePool, token_hash: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Drop sessions past their expiry; returns how many were removed
pub async fn purge_expired_sessions(pool: &SqlitePool, now: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
