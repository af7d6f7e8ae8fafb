//! Cached Value Module
//!
//! Closed set of payloads the application stores in the cache.

use serde::Serialize;

use crate::cache::{CacheKind, CacheStore};
use crate::error::Result;
use crate::models::{GradeReport, Student};

/// Well-known key of the precomputed statistics report.
pub const STATISTICS_REPORT_KEY: &str = "statistics:report";

/// Cache key for a student record.
pub fn student_key(student_id: &str) -> String {
    format!("student:{}", student_id)
}

/// Cache key for a student's grade report.
pub fn grade_report_key(student_id: &str) -> String {
    format!("grade_report:{}", student_id)
}

// == Cached Value ==
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CachedValue {
    Student(Student),
    GradeReport(GradeReport),
    Statistics(String),
}

impl CachedValue {
    /// The kind this payload is filed under.
    pub fn kind(&self) -> CacheKind {
        match self {
            CachedValue::Student(_) => CacheKind::Student,
            CachedValue::GradeReport(_) => CacheKind::GradeReport,
            CachedValue::Statistics(_) => CacheKind::Statistics,
        }
    }

    pub fn as_student(&self) -> Option<&Student> {
        match self {
            CachedValue::Student(student) => Some(student),
            _ => None,
        }
    }

    pub fn as_statistics(&self) -> Option<&str> {
        match self {
            CachedValue::Statistics(report) => Some(report),
            _ => None,
        }
    }
}

impl CacheStore<CachedValue> {
    /// Stores `value` with the default TTL, filed under its own kind.
    pub fn put_value(&self, key: impl Into<String>, value: CachedValue) -> Result<()> {
        let kind = value.kind();
        self.put(key, value, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(student_key("STU001"), "student:STU001");
        assert_eq!(grade_report_key("STU001"), "grade_report:STU001");
    }

    #[test]
    fn test_kind_matches_variant() {
        let student = CachedValue::Student(Student::new("STU001", "Ada", "ada@example.edu"));
        assert_eq!(student.kind(), CacheKind::Student);
        assert_eq!(student.as_student().map(|s| s.id.as_str()), Some("STU001"));
        assert!(student.as_statistics().is_none());

        let report = CachedValue::GradeReport(GradeReport {
            student_id: "STU001".to_string(),
            grades: Vec::new(),
            average: 0.0,
        });
        assert_eq!(report.kind(), CacheKind::GradeReport);
        assert!(matches!(report, CachedValue::GradeReport(_)));

        let stats = CachedValue::Statistics("{}".to_string());
        assert_eq!(stats.kind(), CacheKind::Statistics);
        assert_eq!(stats.as_statistics(), Some("{}"));
    }

    #[test]
    fn test_put_value_files_under_payload_kind() {
        let cache: CacheStore<CachedValue> = CacheStore::new(10, None);
        let student = Student::new("STU001", "Ada", "ada@example.edu");

        cache
            .put_value(student_key(&student.id), CachedValue::Student(student))
            .unwrap();
        cache
            .put_value(STATISTICS_REPORT_KEY, CachedValue::Statistics("{}".to_string()))
            .unwrap();

        assert_eq!(cache.invalidate_by_type(CacheKind::Student), 1);
        assert_eq!(cache.invalidate_by_type(CacheKind::Statistics), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let value = CachedValue::Statistics("report".to_string());
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["type"], "statistics");
        assert_eq!(json["data"], "report");
    }
}
