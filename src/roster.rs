//! The single state container behind the roster view. All mutations go
//! through the methods below; remote results are applied against whatever the
//! state is when they arrive.
//!
//! Each user action is split in two halves: a `prepare_*` method validates the
//! drafts and produces the request to send, and an `apply_*` method folds the
//! server's answer back in. Nothing in between touches the roster, so a failed
//! request leaves every field exactly as the user left it.

use thiserror::Error;

use crate::marks::{join_marks, parse_marks, MarkParseError};
use crate::models::{MarksUpdate, Student, StudentDraft};
use crate::summary::ClassSummary;

/// Validation failures that block a submission before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("Please fill in all fields.")]
    MissingFields,
    #[error("Please select a student.")]
    NoSelection,
    #[error(transparent)]
    InvalidMark(#[from] MarkParseError),
}

#[derive(Debug, Default)]
pub struct Roster {
    students: Vec<Student>,
    new_student: StudentDraft,
    selected_student: Option<Student>,
    new_marks: String,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn find(&self, student_id: &str) -> Option<&Student> {
        self.students
            .iter()
            .find(|student| student.student_id == student_id)
    }

    pub fn draft(&self) -> &StudentDraft {
        &self.new_student
    }

    pub fn draft_mut(&mut self) -> &mut StudentDraft {
        &mut self.new_student
    }

    pub fn selected(&self) -> Option<&Student> {
        self.selected_student.as_ref()
    }

    pub fn marks_draft(&self) -> &str {
        &self.new_marks
    }

    pub fn marks_draft_mut(&mut self) -> &mut String {
        &mut self.new_marks
    }

    pub fn summary(&self) -> ClassSummary<'_> {
        ClassSummary::compute(&self.students)
    }

    /// Seed the roster with the initial fetch.
    pub fn replace_all(&mut self, students: Vec<Student>) {
        self.students = students;
    }

    /// Validate the creation draft and return the trimmed request body.
    pub fn prepare_create(&self) -> Result<StudentDraft, RosterError> {
        let student_id = self.new_student.student_id.trim();
        let name = self.new_student.name.trim();
        if student_id.is_empty() || name.is_empty() {
            return Err(RosterError::MissingFields);
        }
        Ok(StudentDraft::new(student_id, name))
    }

    /// Append the server's record and reset the creation draft.
    pub fn apply_created(&mut self, student: Student) {
        self.students.push(student);
        self.new_student = StudentDraft::default();
    }

    /// Make the student with `student_id` the marks-update target and load
    /// its current marks into the draft. Returns `false` for unknown ids.
    pub fn select(&mut self, student_id: &str) -> bool {
        let Some(student) = self.find(student_id).cloned() else {
            return false;
        };
        self.new_marks = join_marks(&student.marks, ",");
        self.selected_student = Some(student);
        true
    }

    /// Validate the marks draft against the current selection.
    pub fn prepare_marks_update(&self) -> Result<MarksUpdate, RosterError> {
        let selected = self
            .selected_student
            .as_ref()
            .ok_or(RosterError::NoSelection)?;
        let marks = parse_marks(&self.new_marks)?;
        Ok(MarksUpdate {
            student_id: selected.student_id.clone(),
            marks,
        })
    }

    /// Replace the entry for `student_id` with the server's record, then clear
    /// the selection and the marks draft.
    pub fn apply_marks_updated(&mut self, student_id: &str, updated: Student) {
        if let Some(slot) = self
            .students
            .iter_mut()
            .find(|student| student.student_id == student_id)
        {
            *slot = updated;
        }
        self.selected_student = None;
        self.new_marks.clear();
    }
}
