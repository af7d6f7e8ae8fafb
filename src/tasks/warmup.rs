//! Cache Warmup Task
//!
//! One-shot population of the cache from the repositories at startup.
//! Warmup is best-effort: every failure is logged and skipped, and a value
//! that could not be warmed is simply computed on its first real request.

use serde::Serialize;
use tracing::{info, warn};

use crate::cache::CacheStore;
use crate::models::{
    student_key, CachedValue, StatisticsSource, StudentSource, STATISTICS_REPORT_KEY,
};

/// Outcome of a warmup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarmupReport {
    pub students_cached: usize,
    /// Students returned by the source that could not be stored
    pub students_skipped: usize,
    pub statistics_cached: bool,
}

/// Pre-populates `cache` with every student and the statistics report.
///
/// Never fails. Safe to run while other threads already use the cache.
pub fn warm_up(
    cache: &CacheStore<CachedValue>,
    students: &dyn StudentSource,
    statistics: &dyn StatisticsSource,
) -> WarmupReport {
    let mut report = WarmupReport::default();

    match students.all_students() {
        Ok(roster) => {
            for student in roster {
                let key = student_key(&student.id);
                match cache.put_value(key.as_str(), CachedValue::Student(student)) {
                    Ok(()) => report.students_cached += 1,
                    Err(e) => {
                        warn!(%key, error = %e, "Skipping student during cache warmup");
                        report.students_skipped += 1;
                    }
                }
            }
        }
        Err(e) => warn!(error = %e, "Could not load students for cache warmup"),
    }

    match statistics.statistics_report() {
        Ok(text) => {
            match cache.put_value(STATISTICS_REPORT_KEY, CachedValue::Statistics(text)) {
                Ok(()) => report.statistics_cached = true,
                Err(e) => warn!(error = %e, "Could not cache statistics report"),
            }
        }
        Err(e) => warn!(error = %e, "Could not compute statistics report for cache warmup"),
    }

    info!(
        students = report.students_cached,
        skipped = report.students_skipped,
        statistics = report.statistics_cached,
        "Cache warmup complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    use crate::cache::CacheKind;
    use crate::models::Student;

    struct Roster(Vec<Student>);

    impl StudentSource for Roster {
        fn all_students(&self) -> anyhow::Result<Vec<Student>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenRoster;

    impl StudentSource for BrokenRoster {
        fn all_students(&self) -> anyhow::Result<Vec<Student>> {
            Err(anyhow!("students.csv unreadable"))
        }
    }

    struct Report(&'static str);

    impl StatisticsSource for Report {
        fn statistics_report(&self) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn roster(ids: &[&str]) -> Roster {
        Roster(
            ids.iter()
                .map(|id| Student::new(*id, format!("Student {}", id), format!("{}@example.edu", id)))
                .collect(),
        )
    }

    #[test]
    fn test_warm_up_caches_students_and_statistics() {
        let cache = CacheStore::new(150, None);

        let report = warm_up(&cache, &roster(&["STU001", "STU002"]), &Report("{\"count\":2}"));

        assert_eq!(report.students_cached, 2);
        assert!(report.statistics_cached);
        assert_eq!(cache.len(), 3);

        let student = cache.get("student:STU002").unwrap().unwrap();
        assert_eq!(student.as_student().map(|s| s.id.as_str()), Some("STU002"));

        let stats = cache.get(STATISTICS_REPORT_KEY).unwrap().unwrap();
        assert_eq!(stats.as_statistics(), Some("{\"count\":2}"));
    }

    #[test]
    fn test_warm_up_survives_failing_student_source() {
        let cache = CacheStore::new(150, None);

        let report = warm_up(&cache, &BrokenRoster, &Report("ok"));

        assert_eq!(report.students_cached, 0);
        assert!(report.statistics_cached);
        assert_eq!(cache.invalidate_by_type(CacheKind::Student), 0);
    }

    #[test]
    fn test_warm_up_skips_students_with_invalid_ids() {
        let cache = CacheStore::new(150, None);
        let long_id = "x".repeat(300);

        let report = warm_up(&cache, &roster(&["STU001", long_id.as_str()]), &Report("ok"));

        assert_eq!(report.students_cached, 1);
        assert_eq!(report.students_skipped, 1);
        assert_eq!(cache.len(), 2);
    }
}
