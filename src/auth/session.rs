use axum::http::{header, HeaderMap};
use hmac::{Hmac, Mac};
use rand::Rng;
use rusqlite::{params, OptionalExtension};
use sha2::Sha256;

use crate::db::models::AdminSession;
use crate::db::StoreError;
use crate::state::DbPool;

type HmacSha256 = Hmac<Sha256>;

/// Create a new session for an admin. Returns the session token.
pub fn create_session(pool: &DbPool, username: &str, hours: u64) -> Result<String, StoreError> {
    let conn = pool.get()?;

    let purged = conn.execute(
        "DELETE FROM admin_sessions WHERE expires_at <= datetime('now')",
        [],
    )?;
    if purged > 0 {
        tracing::debug!("Purged {} expired admin sessions", purged);
    }

    let token = generate_token();
    conn.execute(
        "INSERT INTO admin_sessions (token, username, expires_at)
         VALUES (?1, ?2, datetime('now', ?3))",
        params![token, username, format!("+{} hours", hours)],
    )?;

    Ok(token)
}

/// Look up an unexpired session.
pub fn find_session(pool: &DbPool, token: &str) -> Result<Option<AdminSession>, StoreError> {
    let conn = pool.get()?;
    let session = conn
        .query_row(
            "SELECT token, username, expires_at FROM admin_sessions
             WHERE token = ?1 AND expires_at > datetime('now')",
            params![token],
            |row| {
                Ok(AdminSession {
                    token: row.get(0)?,
                    username: row.get(1)?,
                    expires_at: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(session)
}

/// Delete a session by token.
pub fn delete_session(pool: &DbPool, token: &str) -> Result<bool, StoreError> {
    let conn = pool.get()?;
    let rows = conn.execute("DELETE FROM admin_sessions WHERE token = ?1", params![token])?;
    Ok(rows > 0)
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

// -- Cookie signing --

fn mac_for(secret: &str, token: &str) -> HmacSha256 {
    // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("hmac key length is unrestricted"));
    mac.update(token.as_bytes());
    mac
}

/// Cookie value for a token: `token.signature`.
pub fn sign(secret: &str, token: &str) -> String {
    let signature = mac_for(secret, token).finalize().into_bytes();
    format!("{}.{}", token, hex::encode(signature))
}

/// Returns the token when the signature matches.
pub fn verify<'a>(secret: &str, cookie_value: &'a str) -> Option<&'a str> {
    let (token, signature) = cookie_value.split_once('.')?;
    let signature = hex::decode(signature).ok()?;
    mac_for(secret, token).verify_slice(&signature).ok()?;
    Some(token)
}

// -- Cookie helpers --

pub fn session_cookie(name: &str, value: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours.saturating_mul(3600);
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, value, max_age_secs
    )
}

pub fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

pub fn get_cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let (key, val) = cookie.split_once('=')?;
            if key.trim() == name {
                Some(val.trim())
            } else {
                None
            }
        })
}
