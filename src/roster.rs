//! In-memory roster used by the binary as its repository stand-in.

use std::collections::HashMap;

use anyhow::{bail, Result};
use chrono::Utc;
use serde_json::json;

use crate::models::{GradeLine, GradeReport, StatisticsSource, Student, StudentSource};

#[derive(Debug, Default)]
pub struct InMemoryRoster {
    students: Vec<Student>,
    grades: HashMap<String, Vec<GradeLine>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small fixed roster for demos.
    pub fn sample() -> Self {
        let mut roster = Self::new();
        roster.add_student(Student::new("STU001", "Ada Lovelace", "ada@example.edu"));
        roster.add_student(Student::new("STU002", "Alan Turing", "alan@example.edu"));
        roster.add_student(Student::new("STU003", "Grace Hopper", "grace@example.edu"));

        roster.add_grade("STU001", "Mathematics", 18.5);
        roster.add_grade("STU001", "Physics", 16.0);
        roster.add_grade("STU002", "Mathematics", 19.0);
        roster.add_grade("STU003", "Computer Science", 17.5);
        roster
    }

    pub fn add_student(&mut self, student: Student) {
        self.students.push(student);
    }

    pub fn add_grade(&mut self, student_id: &str, course: &str, score: f64) {
        self.grades
            .entry(student_id.to_string())
            .or_default()
            .push(GradeLine {
                course: course.to_string(),
                score,
            });
    }

    /// Builds the grade report for one student.
    pub fn grade_report(&self, student_id: &str) -> Result<GradeReport> {
        if !self.students.iter().any(|s| s.id == student_id) {
            bail!("unknown student {}", student_id);
        }

        let grades = self.grades.get(student_id).cloned().unwrap_or_default();
        let average = mean(grades.iter().map(|g| g.score));

        Ok(GradeReport {
            student_id: student_id.to_string(),
            grades,
            average,
        })
    }
}

impl StudentSource for InMemoryRoster {
    fn all_students(&self) -> Result<Vec<Student>> {
        Ok(self.students.clone())
    }
}

impl StatisticsSource for InMemoryRoster {
    fn statistics_report(&self) -> Result<String> {
        if self.students.is_empty() {
            bail!("no students to report on");
        }

        let averages: Vec<f64> = self
            .students
            .iter()
            .filter_map(|s| self.grades.get(&s.id))
            .map(|grades| mean(grades.iter().map(|g| g.score)))
            .collect();

        let report = json!({
            "students": self.students.len(),
            "graded_students": averages.len(),
            "class_average": mean(averages.iter().copied()),
            "generated_at": Utc::now(),
        });
        Ok(report.to_string())
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_roster() {
        let roster = InMemoryRoster::sample();
        assert_eq!(roster.all_students().unwrap().len(), 3);
    }

    #[test]
    fn test_grade_report() {
        let roster = InMemoryRoster::sample();

        let report = roster.grade_report("STU001").unwrap();
        assert_eq!(report.grades.len(), 2);
        assert!((report.average - 17.25).abs() < 1e-9);

        assert!(roster.grade_report("STU999").is_err());
    }

    #[test]
    fn test_statistics_report() {
        let roster = InMemoryRoster::sample();

        let report: serde_json::Value =
            serde_json::from_str(&roster.statistics_report().unwrap()).unwrap();
        assert_eq!(report["students"], 3);
        assert_eq!(report["graded_students"], 3);
        let average = report["class_average"].as_f64().unwrap();
        assert!((average - (17.25 + 19.0 + 17.5) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_report_empty_roster_fails() {
        assert!(InMemoryRoster::new().statistics_report().is_err());
    }
}
