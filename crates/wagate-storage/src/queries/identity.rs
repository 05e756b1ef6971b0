// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity resolution and roster management.

use rusqlite::params;

use wagate_core::WagateError;

use crate::database::Database;
use crate::models::{Identity, Student, Teacher};

/// Resolve an attendance code against both identity tables in one query.
///
/// Returns `None` when the code matches neither table. Codes are unique
/// per table and schools hand out disjoint code sets, so the first row wins.
pub async fn resolve_code(db: &Database, code: &str) -> Result<Option<Identity>, WagateError> {
    let code = code.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT 'student' AS kind, id, code, name, '' AS phone
                   FROM students WHERE code = ?1
                 UNION ALL
                 SELECT 'teacher', id, code, name, phone
                   FROM teachers WHERE code = ?1
                 LIMIT 1",
            )?;
            let result = stmt.query_row(params![code], |row| {
                let kind: String = row.get(0)?;
                let id: i64 = row.get(1)?;
                let code: String = row.get(2)?;
                let name: String = row.get(3)?;
                let phone: String = row.get(4)?;
                Ok(match kind.as_str() {
                    "student" => Identity::Student(Student { id, code, name }),
                    _ => Identity::Teacher(Teacher {
                        id,
                        code,
                        name,
                        phone,
                    }),
                })
            });
            match result {
                Ok(identity) => Ok(Some(identity)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a student and return the new row id.
pub async fn create_student(
    db: &Database,
    code: &str,
    name: &str,
) -> Result<i64, WagateError> {
    let code = code.to_string();
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO students (code, name) VALUES (?1, ?2)",
                params![code, name],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a teacher and return the new row id.
pub async fn create_teacher(
    db: &Database,
    code: &str,
    name: &str,
    phone: &str,
) -> Result<i64, WagateError> {
    let code = code.to_string();
    let name = name.to_string();
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO teachers (code, name, phone) VALUES (?1, ?2, ?3)",
                params![code, name, phone],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
