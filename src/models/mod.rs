//! Domain Models Module
//!
//! Types the grade tracker caches, and the collaborator interfaces that
//! supply them.

mod sources;
mod student;
mod value;

pub use sources::{StatisticsSource, StudentSource};
pub use student::{GradeLine, GradeReport, Student};
pub use value::{grade_report_key, student_key, CachedValue, STATISTICS_REPORT_KEY};
