//! API token repository: bearer tokens stored as SHA-256 hashes,
//! resolved to the owning user id by the auth middleware.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;

/// Stores a new token hash for a user.
pub fn insert_api_token(
    conn: &Connection,
    token_hash: &str,
    user_id: &str,
    label: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO api_tokens (token_hash, user_id, label, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![token_hash, user_id, label, Utc::now()],
    )?;
    Ok(())
}

/// Resolves a token hash to its user id. `None` for unknown tokens.
pub fn lookup_token_user(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<String>, DatabaseError> {
    let user = conn
        .query_row(
            "SELECT user_id FROM api_tokens WHERE token_hash = ?1",
            params![token_hash],
            |row| row.get(0),
        )
        .optional()?;
    Ok(user)
}

/// Number of stored tokens (used to decide first-run minting).
pub fn count_api_tokens(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM api_tokens", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn insert_and_lookup_round_trip() {
        let conn = open_memory_database().unwrap();
        insert_api_token(&conn, "hash-a", "alice", "local").unwrap();
        insert_api_token(&conn, "hash-b", "bob", "local").unwrap();

        assert_eq!(lookup_token_user(&conn, "hash-a").unwrap().as_deref(), Some("alice"));
        assert_eq!(lookup_token_user(&conn, "hash-b").unwrap().as_deref(), Some("bob"));
        assert_eq!(count_api_tokens(&conn).unwrap(), 2);
    }

    #[test]
    fn unknown_hash_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(lookup_token_user(&conn, "no-such-hash").unwrap().is_none());
        assert_eq!(count_api_tokens(&conn).unwrap(), 0);
    }
}
