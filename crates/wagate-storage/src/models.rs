// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for attendance storage.

use serde::{Deserialize, Serialize};

/// A student row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// A teacher row. `phone` is the raw number as entered by the school
/// administrator; it is canonicalized only at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub phone: String,
}

/// Result of resolving an attendance code across both identity tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Student(Student),
    Teacher(Teacher),
}

/// Whether a daily fact was freshly written or already existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    AlreadyRecorded,
}

impl RecordOutcome {
    pub fn newly_recorded(&self) -> bool {
        matches!(self, RecordOutcome::Recorded)
    }
}

/// Combined outcome of a teacher check-in: the two facts are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeacherDayOutcome {
    pub teaching: RecordOutcome,
    pub roll_call: RecordOutcome,
}
