pub mod models;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use thiserror::Error;

use crate::config::AdminSeed;
use crate::state::DbPool;

pub const MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial",
    include_str!("../../migrations/001_initial.sql"),
)];

/// Failure talking to the database from request-time code.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("No unused ticket code after {0} attempts")]
    TicketCodesExhausted(usize),
}

pub fn create_pool(db_path: &Path) -> anyhow::Result<DbPool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Connection-scoped pragmas have to run on every pooled connection
    let manager = SqliteConnectionManager::file(db_path).with_init(|c| {
        c.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            ",
        )
    });
    let pool = Pool::builder().max_size(8).build(manager)?;

    let conn = pool.get()?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        ",
    )?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let conn = pool.get()?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        if !already_applied {
            tracing::info!("Applying migration: {}", name);
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_version (name) VALUES (?1)",
                params![name],
            )?;
        }
    }

    tracing::info!("Database migrations complete");
    Ok(())
}

/// Insert admins listed in the config. Existing usernames are left alone so
/// externally managed passwords are never overwritten.
pub fn seed_admins(pool: &DbPool, admins: &[AdminSeed]) -> anyhow::Result<usize> {
    let conn = pool.get()?;
    let mut created = 0;

    for admin in admins {
        let username = admin.username.trim();
        if username.is_empty() || admin.password.is_empty() {
            tracing::warn!("Skipping admin seed with empty username or password");
            continue;
        }

        let hash = bcrypt::hash(&admin.password, bcrypt::DEFAULT_COST)?;
        let rows = conn.execute(
            "INSERT OR IGNORE INTO admins (username, password) VALUES (?1, ?2)",
            params![username, hash],
        )?;
        if rows > 0 {
            tracing::info!("Seeded admin account: {}", username);
            created += 1;
        }
    }

    Ok(created)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Single-connection in-memory pool with the schema applied.
    pub(crate) fn test_pool() -> DbPool {
        let manager = SqliteConnectionManager::memory()
            .with_init(|c| c.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder().max_size(1).build(manager).unwrap();
        run_migrations(&pool).unwrap();
        pool
    }

    fn table_names(pool: &DbPool) -> Vec<String> {
        let conn = pool.get().unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn create_pool_creates_db_file() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("sub/dir/test.db");
        let pool = create_pool(&db_path).unwrap();
        assert!(db_path.exists());
        let conn = pool.get().unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[test]
    fn migrations_create_tables() {
        let pool = test_pool();
        let tables = table_names(&pool);
        assert!(tables.contains(&"reservations".to_string()));
        assert!(tables.contains(&"admins".to_string()));
        assert!(tables.contains(&"admin_sessions".to_string()));
    }

    #[test]
    fn migrations_are_idempotent() {
        let pool = test_pool();
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as i64);
    }

    #[test]
    fn seat_uniqueness_is_enforced() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO reservations (passenger_name, seat_row, seat_col, e_ticket_number)
             VALUES ('A B', 2, 1, 'ABX1')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO reservations (passenger_name, seat_row, seat_col, e_ticket_number)
             VALUES ('C D', 2, 1, 'CDX2')",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn seat_bounds_are_checked() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let result = conn.execute(
            "INSERT INTO reservations (passenger_name, seat_row, seat_col, e_ticket_number)
             VALUES ('A B', 12, 0, 'ABX1')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn seed_admins_hashes_and_skips_existing() {
        let pool = test_pool();
        pool.get()
            .unwrap()
            .execute(
                "INSERT INTO admins (username, password) VALUES ('root', 'plain')",
                [],
            )
            .unwrap();

        let seeds = vec![
            AdminSeed {
                username: "root".into(),
                password: "other".into(),
            },
            AdminSeed {
                username: "ops".into(),
                password: "s3cret".into(),
            },
        ];
        assert_eq!(seed_admins(&pool, &seeds).unwrap(), 1);

        let conn = pool.get().unwrap();
        let root: String = conn
            .query_row("SELECT password FROM admins WHERE username = 'root'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(root, "plain");

        let ops: String = conn
            .query_row("SELECT password FROM admins WHERE username = 'ops'", [], |r| r.get(0))
            .unwrap();
        assert!(bcrypt::verify("s3cret", &ops).unwrap());
    }
}
