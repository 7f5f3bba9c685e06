//! User storage — upserted on every interaction start.

use chrono::Utc;

use crate::error::DatabaseError;
use crate::models::User;
use crate::store::Database;

/// CRUD operations for users.
pub struct UserStore;

impl UserStore {
    /// Insert or refresh a user keyed by telegram id.
    ///
    /// Name fields are refreshed on conflict; `created_at` keeps the
    /// original value.
    pub fn upsert(db: &Database, user: &User) -> Result<(), DatabaseError> {
        let conn = db.conn();
        conn.execute(
            "INSERT INTO users (telegram_id, username, first_name, last_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(telegram_id) DO UPDATE SET
                 username = excluded.username,
                 first_name = excluded.first_name,
                 last_name = excluded.last_name",
            rusqlite::params![
                user.telegram_id,
                user.username,
                user.first_name,
                user.last_name,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch a user by telegram id.
    pub fn get(db: &Database, telegram_id: i64) -> Result<Option<User>, DatabaseError> {
        let conn = db.conn();
        let mut stmt = conn.prepare(
            "SELECT telegram_id, username, first_name, last_name
             FROM users WHERE telegram_id = ?1",
        )?;
        let mut rows = stmt.query_map([telegram_id], |row| {
            Ok(User {
                telegram_id: row.get(0)?,
                username: row.get(1)?,
                first_name: row.get(2)?,
                last_name: row.get(3)?,
            })
        })?;
        rows.next().transpose().map_err(Into::into)
    }
}
