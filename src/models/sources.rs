//! Collaborator interfaces consumed by warmup.
//!
//! Repositories live outside the cache; they only hand values over.

use crate::models::Student;

/// Source of truth for the student roster.
pub trait StudentSource: Send + Sync {
    fn all_students(&self) -> anyhow::Result<Vec<Student>>;
}

/// Computes the aggregate statistics report.
pub trait StatisticsSource: Send + Sync {
    fn statistics_report(&self) -> anyhow::Result<String>;
}
