// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD with first-touch lazy creation.
//!
//! Users are created the first time they interact with the bot. Two
//! updates for the same fresh user can race; `ensure_user` recovers by
//! re-reading the row the other task inserted (insert-then-reread), so
//! the unique-constraint conflict never surfaces to callers.

use brigadir_core::{BrigadirError, Role, User};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::parse_column;

const USER_COLUMNS: &str = "id, telegram_id, role, city, is_active, created_at";

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    let role: String = row.get(2)?;
    let role = if role.is_empty() {
        None
    } else {
        Some(parse_column(2, &role)?)
    };
    Ok(User {
        id: row.get(0)?,
        telegram_id: row.get(1)?,
        role,
        city: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Get a user by Telegram id.
pub async fn get_by_telegram_id(
    db: &Database,
    telegram_id: i64,
) -> Result<Option<User>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?1"),
                params![telegram_id],
                row_to_user,
            );
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Ensure a user row exists for `telegram_id`, optionally setting the
/// role, and return the current row.
///
/// Explicit two-step idempotent upsert: INSERT, and on a unique
/// violation re-read the row the concurrent insert won with. When
/// `role` is given it is applied either way.
pub async fn ensure_user(
    db: &Database,
    telegram_id: i64,
    role: Option<Role>,
) -> Result<User, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let role_text = role.map(|r| r.to_string()).unwrap_or_default();
            let inserted = conn.execute(
                "INSERT INTO users (telegram_id, role) VALUES (?1, ?2)",
                params![telegram_id, role_text],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    // Lost the first-touch race; the row exists now.
                    if role.is_some() {
                        conn.execute(
                            "UPDATE users SET role = ?1 WHERE telegram_id = ?2 AND role != ?1",
                            params![role_text, telegram_id],
                        )?;
                    }
                }
                Err(e) => return Err(e),
            }
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?1"),
                params![telegram_id],
                row_to_user,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Set the role for a user, creating the row if needed.
pub async fn set_role(db: &Database, telegram_id: i64, role: Role) -> Result<User, BrigadirError> {
    ensure_user(db, telegram_id, Some(role)).await
}

/// Enable or disable a user account. `None` when the user is unknown.
pub async fn set_active(
    db: &Database,
    telegram_id: i64,
    is_active: bool,
) -> Result<Option<User>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE users SET is_active = ?1 WHERE telegram_id = ?2",
                params![is_active, telegram_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?1"),
                params![telegram_id],
                row_to_user,
            )
            .map(Some)
        })
        .await
        .map_err(map_tr_err)
}

/// List users with optional role and activity filters, newest first.
pub async fn list_users(
    db: &Database,
    role: Option<Role>,
    active: Option<bool>,
    limit: i64,
) -> Result<Vec<User>, BrigadirError> {
    db.connection()
        .call(move |conn| {
            let mut sql = format!("SELECT {USER_COLUMNS} FROM users WHERE 1 = 1");
            let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            if let Some(role) = role {
                sql.push_str(" AND role = ?");
                args.push(Box::new(role.to_string()));
            }
            if let Some(active) = active {
                sql.push_str(" AND is_active = ?");
                args.push(Box::new(active));
            }
            sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");
            args.push(Box::new(limit));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(
                rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
                row_to_user,
            )?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Total user count.
pub async fn count_users(db: &Database) -> Result<i64, BrigadirError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}

/// User counts grouped by role. The empty string groups unassigned users.
pub async fn count_by_role(db: &Database) -> Result<Vec<(String, i64)>, BrigadirError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY COUNT(*) DESC",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn ensure_user_creates_once() {
        let (db, _dir) = setup_db().await;

        let first = ensure_user(&db, 42, None).await.unwrap();
        assert_eq!(first.telegram_id, 42);
        assert_eq!(first.role, None);
        assert!(first.is_active);

        let second = ensure_user(&db, 42, None).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(count_users(&db).await.unwrap(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ensure_user_applies_role_to_existing_row() {
        let (db, _dir) = setup_db().await;
        ensure_user(&db, 42, None).await.unwrap();

        let promoted = ensure_user(&db, 42, Some(Role::Manager)).await.unwrap();
        assert_eq!(promoted.role, Some(Role::Manager));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_first_touch_creates_one_row() {
        let (db, _dir) = setup_db().await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let db = db.clone();
            handles.push(tokio::spawn(
                async move { ensure_user(&db, 42, None).await },
            ));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(count_users(&db).await.unwrap(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn set_active_toggles_and_reports_missing() {
        let (db, _dir) = setup_db().await;
        ensure_user(&db, 42, None).await.unwrap();

        let disabled = set_active(&db, 42, false).await.unwrap().unwrap();
        assert!(!disabled.is_active);

        assert!(set_active(&db, 777, false).await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_users_filters_role_and_activity() {
        let (db, _dir) = setup_db().await;
        set_role(&db, 1, Role::Manager).await.unwrap();
        set_role(&db, 2, Role::Master).await.unwrap();
        set_role(&db, 3, Role::Master).await.unwrap();
        set_active(&db, 3, false).await.unwrap();

        let masters = list_users(&db, Some(Role::Master), None, 100).await.unwrap();
        assert_eq!(masters.len(), 2);

        let active_masters = list_users(&db, Some(Role::Master), Some(true), 100)
            .await
            .unwrap();
        assert_eq!(active_masters.len(), 1);
        assert_eq!(active_masters[0].telegram_id, 2);

        let everyone = list_users(&db, None, None, 2).await.unwrap();
        assert_eq!(everyone.len(), 2, "limit applies");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn count_by_role_groups_unassigned_as_empty() {
        let (db, _dir) = setup_db().await;
        ensure_user(&db, 1, None).await.unwrap();
        set_role(&db, 2, Role::Master).await.unwrap();
        set_role(&db, 3, Role::Master).await.unwrap();

        let counts = count_by_role(&db).await.unwrap();
        assert_eq!(counts[0], ("master".to_string(), 2));
        assert!(counts.contains(&(String::new(), 1)));

        db.close().await.unwrap();
    }
}
