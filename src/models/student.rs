//! Student and grade report records as produced by the repositories.

use serde::Serialize;

/// A student record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    /// Identifier such as `STU001`
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Student {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// One graded course in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeLine {
    pub course: String,
    pub score: f64,
}

/// Per-student grade summary computed by the grade repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReport {
    pub student_id: String,
    pub grades: Vec<GradeLine>,
    pub average: f64,
}
