//! Domain models exchanged with the roster backend and passed throughout the
//! TUI. They stay light-weight data holders; the maths lives in `summary` and
//! the state transitions live in `roster`. The serde shapes mirror the JSON the
//! backend speaks, field for field, so the same types serve as request bodies,
//! response bodies and the in-memory cache.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::summary::student_average;

/// A single mark as the backend stores it.
pub type Mark = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A student record as returned by the backend. The client only ever holds a
/// cached copy; the server response always wins during reconciliation.
pub struct Student {
    /// Caller-assigned identifier, immutable after creation.
    pub student_id: String,
    /// Display name shown in the table and the selector.
    pub name: String,
    /// Marks in entry order. Freshly created students usually come back
    /// without any, so a missing field is read as an empty list.
    #[serde(default)]
    pub marks: Vec<Mark>,
}

impl Student {
    pub fn new(student_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
            marks: Vec::new(),
        }
    }

    /// Builder-style helper used by fixtures and the mock backend.
    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    /// Average of this student's marks, `0.0` when there are none. Never
    /// stored so it cannot drift from `marks`.
    pub fn average(&self) -> f64 {
        student_average(&self.marks)
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Name: {}, Average Marks: {:.2}",
            self.student_id,
            self.name,
            self.average()
        )
    }
}

/// Creation draft. Doubles as the `POST /api/students` request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDraft {
    /// Identifier typed into the add form. Trimmed before it is sent; the
    /// backend decides whether it is unique.
    pub student_id: String,
    /// Display name typed into the add form, trimmed the same way.
    pub name: String,
}

impl StudentDraft {
    pub fn new(student_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
        }
    }
}

/// Body of `PUT /api/students/{student_id}/marks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarksPayload {
    /// Complete replacement list. The backend overwrites the stored marks
    /// rather than appending to them.
    pub marks: Vec<Mark>,
}

/// A validated marks submission for one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarksUpdate {
    /// Student the marks belong to. Travels in the URL path, not the body.
    pub student_id: String,
    /// Parsed marks in the order they were typed.
    pub marks: Vec<Mark>,
}

impl MarksUpdate {
    /// Request body for the marks endpoint.
    pub fn payload(&self) -> MarksPayload {
        MarksPayload {
            marks: self.marks.clone(),
        }
    }
}
