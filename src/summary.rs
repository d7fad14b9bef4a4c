//! Class-wide figures derived from the roster. Everything here is a pure
//! reduction over the current student list and is recomputed on every draw.

use crate::models::{Mark, Student};

/// Average of a marks list. An empty list averages to `0.0` instead of
/// dividing by zero.
pub fn student_average(marks: &[Mark]) -> f64 {
    total_marks(marks) / marks.len().max(1) as f64
}

/// Marks carry no range limit, so totals are accumulated in `f64` rather than
/// `Mark`.
fn total_marks<'a>(marks: impl IntoIterator<Item = &'a Mark>) -> f64 {
    marks.into_iter().map(|&mark| mark as f64).sum()
}

/// Sum of every mark in the class divided by the number of *students*, not the
/// number of marks. Students without marks still count in the denominator.
pub fn class_average(students: &[Student]) -> f64 {
    if students.is_empty() {
        return 0.0;
    }
    let total = total_marks(students.iter().flat_map(|student| student.marks.iter()));
    total / students.len() as f64
}

/// The best student together with the average that earned the spot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopStudent<'a> {
    pub student: &'a Student,
    pub average: f64,
}

/// Single pass over the roster. Only a strictly greater average replaces the
/// current leader, so the first student to reach the maximum keeps the spot.
pub fn top_student(students: &[Student]) -> Option<TopStudent<'_>> {
    let mut top: Option<TopStudent<'_>> = None;
    for student in students {
        let average = student.average();
        match top {
            Some(current) if average <= current.average => {}
            _ => top = Some(TopStudent { student, average }),
        }
    }
    top
}

/// Snapshot rendered in the "Class Summary" panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSummary<'a> {
    pub class_average: f64,
    pub top: Option<TopStudent<'a>>,
}

impl<'a> ClassSummary<'a> {
    pub fn compute(students: &'a [Student]) -> Self {
        Self {
            class_average: class_average(students),
            top: top_student(students),
        }
    }
}
