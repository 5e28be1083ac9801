//! The analytics report printed by the CLI.
//!
//! Reports are built fresh from the loaded tables on every run and written
//! to stdout only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::StudentSummary;
use crate::statistics::Analytics;

/// One analytics snapshot with the distinct-student summaries behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// What the analytics were computed from.
    pub source: ReportSource,
    pub analytics: Analytics,
    pub students: Vec<StudentSummary>,
}

/// Origin of a report's table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportSource {
    /// A general upload, by file name.
    Dataset { name: String },
    /// A combined exam set.
    ExamSet { id: Uuid, name: String },
}

impl AnalyticsReport {
    pub fn new(source: ReportSource, analytics: Analytics, students: Vec<StudentSummary>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source,
            analytics,
            students,
        }
    }

    /// Pretty JSON for stdout.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Columns;
    use crate::statistics::compute_analytics;

    fn analytics(math: &str) -> Analytics {
        let mut row = Columns::new();
        row.push("name", "Ann");
        row.push("math", math);
        compute_analytics(&[row])
    }

    #[test]
    fn json_tags_the_source() {
        let report = AnalyticsReport::new(
            ReportSource::Dataset {
                name: "class.csv".into(),
            },
            analytics("80"),
            vec![],
        );
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["source"]["kind"], "dataset");
        assert_eq!(value["source"]["name"], "class.csv");
        assert_eq!(value["analytics"]["average_grade"], 80.0);
    }

    #[test]
    fn exam_set_source_carries_id() {
        let id = Uuid::new_v4();
        let report = AnalyticsReport::new(
            ReportSource::ExamSet {
                id,
                name: "Mock 1".into(),
            },
            analytics("55"),
            vec![],
        );
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["source"]["kind"], "exam_set");
        assert_eq!(value["source"]["id"], id.to_string());
    }
}
