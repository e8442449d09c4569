use rusqlite::{params, OptionalExtension};

use crate::db::models::Admin;
use crate::db::StoreError;
use crate::state::DbPool;

/// Check a username/password pair against the admins table.
///
/// Rows written by the seeding code hold bcrypt hashes; rows provisioned by
/// hand may hold the plaintext password, which is compared as-is.
pub fn authenticate(
    pool: &DbPool,
    username: &str,
    password: &str,
) -> Result<Option<Admin>, StoreError> {
    if username.is_empty() {
        return Ok(None);
    }

    let conn = pool.get()?;
    let admin = conn
        .query_row(
            "SELECT username, password FROM admins WHERE username = ?1",
            params![username],
            |row| {
                Ok(Admin {
                    username: row.get(0)?,
                    password: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(admin.filter(|a| password_matches(&a.password, password)))
}

fn password_matches(stored: &str, supplied: &str) -> bool {
    if is_bcrypt_hash(stored) {
        bcrypt::verify(supplied, stored).unwrap_or(false)
    } else {
        stored == supplied
    }
}

fn is_bcrypt_hash(stored: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| stored.starts_with(prefix))
}
