// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attendance recorder: validates a check-in code, applies idempotent
//! insert/update rules for the daily facts, and triggers the roll-call
//! welcome notification for teachers.

use chrono::Local;
use tracing::{debug, info};

use wagate_core::WagateError;
use wagate_storage::Database;
use wagate_storage::models::Identity;
use wagate_storage::queries::{attendance, identity};
use wagate_whatsapp::Dispatcher;

pub use wagate_storage::models::{RecordOutcome, TeacherDayOutcome};

/// Structured outcome of one check-in, distinguishing "already recorded"
/// from "newly recorded" so callers can render distinct UI states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceOutcome {
    Student { presence: RecordOutcome },
    Teacher { day: TeacherDayOutcome },
}

/// The attendance recorder service.
pub struct AttendanceService {
    db: Database,
    dispatcher: Dispatcher,
    api_key: String,
    bot_name: String,
}

impl AttendanceService {
    pub fn new(db: Database, dispatcher: Dispatcher, api_key: String, bot_name: String) -> Self {
        AttendanceService {
            db,
            dispatcher,
            api_key,
            bot_name,
        }
    }

    /// Record a check-in for the identity behind `code`.
    ///
    /// - `Unauthorized` on API key mismatch, before touching the database.
    /// - `Validation` on an empty code.
    /// - `NotFound` when the code matches neither identity table.
    /// - Students get at most one presence row per day.
    /// - Teachers get their teaching fact upserted and their roll-call
    ///   fact inserted at most once per day; a fresh roll-call insert
    ///   fires exactly one welcome notification (fire-and-forget).
    pub async fn record(
        &self,
        code: &str,
        api_key: &str,
    ) -> Result<AttendanceOutcome, WagateError> {
        if api_key != self.api_key {
            return Err(WagateError::Unauthorized("API key tidak valid".into()));
        }

        let code = code.trim();
        if code.is_empty() {
            return Err(WagateError::Validation("kode_guru wajib diisi".into()));
        }

        let identity = identity::resolve_code(&self.db, code)
            .await?
            .ok_or_else(|| WagateError::NotFound(format!("kode `{code}` tidak terdaftar")))?;

        let now = Local::now();
        let date = now.format("%Y-%m-%d").to_string();
        let time = now.format("%H:%M:%S").to_string();

        match identity {
            Identity::Student(student) => {
                let presence =
                    attendance::record_student_presence(&self.db, student.id, &date, &time)
                        .await?;
                debug!(student = student.name.as_str(), outcome = ?presence, "student check-in");
                Ok(AttendanceOutcome::Student { presence })
            }
            Identity::Teacher(teacher) => {
                let day =
                    attendance::record_teacher_day(&self.db, teacher.id, &date, &time).await?;
                if day.roll_call.newly_recorded() {
                    info!(teacher = teacher.name.as_str(), "roll call recorded, sending welcome");
                    self.dispatcher
                        .dispatch_welcome(&teacher.phone, &teacher.name, &self.bot_name);
                }
                Ok(AttendanceOutcome::Teacher { day })
            }
        }
    }
}
