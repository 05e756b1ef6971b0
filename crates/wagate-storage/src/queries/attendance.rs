// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily attendance facts: student presence, teaching attendance, roll call.
//!
//! Each operation runs inside one `call` closure wrapping a transaction,
//! so a request's statements execute on a single connection and the
//! connection is released on every exit path.

use rusqlite::params;

use wagate_core::WagateError;

use crate::database::Database;
use crate::models::{RecordOutcome, TeacherDayOutcome};

/// Record a student's daily presence.
///
/// Inserts at most one row per student per date; a repeat call on the
/// same date leaves the table unchanged and reports `AlreadyRecorded`.
pub async fn record_student_presence(
    db: &Database,
    student_id: i64,
    date: &str,
    arrived_at: &str,
) -> Result<RecordOutcome, WagateError> {
    let date = date.to_string();
    let arrived_at = arrived_at.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM student_presence WHERE student_id = ?1 AND date = ?2)",
                params![student_id, date],
                |row| row.get(0),
            )?;
            let outcome = if exists {
                RecordOutcome::AlreadyRecorded
            } else {
                tx.execute(
                    "INSERT INTO student_presence (student_id, date, arrived_at)
                     VALUES (?1, ?2, ?3)",
                    params![student_id, date, arrived_at],
                )?;
                RecordOutcome::Recorded
            };
            tx.commit()?;
            Ok(outcome)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a teacher's day: teaching attendance and roll call, independently.
///
/// Teaching attendance is inserted when absent and has its status flag
/// updated otherwise: idempotent either way, never duplicated. Roll call
/// is insert-only; the caller dispatches the welcome notification exactly
/// when `roll_call` comes back `Recorded`.
pub async fn record_teacher_day(
    db: &Database,
    teacher_id: i64,
    date: &str,
    arrived_at: &str,
) -> Result<TeacherDayOutcome, WagateError> {
    let date = date.to_string();
    let arrived_at = arrived_at.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let teaching_exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM teaching_attendance WHERE teacher_id = ?1 AND date = ?2)",
                params![teacher_id, date],
                |row| row.get(0),
            )?;
            let teaching = if teaching_exists {
                tx.execute(
                    "UPDATE teaching_attendance SET status = 'hadir'
                     WHERE teacher_id = ?1 AND date = ?2",
                    params![teacher_id, date],
                )?;
                RecordOutcome::AlreadyRecorded
            } else {
                tx.execute(
                    "INSERT INTO teaching_attendance (teacher_id, date, status)
                     VALUES (?1, ?2, 'hadir')",
                    params![teacher_id, date],
                )?;
                RecordOutcome::Recorded
            };

            let roll_call_exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM roll_call WHERE teacher_id = ?1 AND date = ?2)",
                params![teacher_id, date],
                |row| row.get(0),
            )?;
            let roll_call = if roll_call_exists {
                RecordOutcome::AlreadyRecorded
            } else {
                tx.execute(
                    "INSERT INTO roll_call (teacher_id, date, arrived_at)
                     VALUES (?1, ?2, ?3)",
                    params![teacher_id, date, arrived_at],
                )?;
                RecordOutcome::Recorded
            };

            tx.commit()?;
            Ok(TeacherDayOutcome { teaching, roll_call })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count presence rows for a student on a date. Test and report helper.
pub async fn count_student_presence(
    db: &Database,
    student_id: i64,
    date: &str,
) -> Result<i64, WagateError> {
    let date = date.to_string();
    db.connection()
        .call(move |conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM student_presence WHERE student_id = ?1 AND date = ?2",
                params![student_id, date],
                |row| row.get(0),
            )?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count roll-call rows for a teacher on a date. Test and report helper.
pub async fn count_roll_call(
    db: &Database,
    teacher_id: i64,
    date: &str,
) -> Result<i64, WagateError> {
    let date = date.to_string();
    db.connection()
        .call(move |conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM roll_call WHERE teacher_id = ?1 AND date = ?2",
                params![teacher_id, date],
                |row| row.get(0),
            )?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
