// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User account operations.

use rusqlite::params;
use vidya_core::VidyaError;

use crate::database::{Database, map_tr_err};
use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, password_hash, class_name, avatar, role, created_at";

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        class_name: row.get(4)?,
        avatar: row.get(5)?,
        role: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Insert a new user. Fails on a duplicate email (UNIQUE constraint).
pub async fn create_user(db: &Database, user: &User) -> Result<(), VidyaError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, password_hash, class_name, avatar, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    user.id,
                    user.name,
                    user.email,
                    user.password_hash,
                    user.class_name,
                    user.avatar,
                    user.role,
                    user.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a user by email (stored lowercased).
pub async fn get_user_by_email(db: &Database, email: &str) -> Result<Option<User>, VidyaError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                map_user_row,
            );
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a user by id.
pub async fn get_user_by_id(db: &Database, id: &str) -> Result<Option<User>, VidyaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                map_user_row,
            );
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}
