use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Course metadata supplied by the course collaborator. Only the fields the
/// assessment engine consumes are modeled here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// JSON array of learning-objective strings.
    pub objectives: Option<JsonValue>,
    pub instructor_id: Uuid,
    /// JSON array of { title, duration_minutes }.
    pub lectures: JsonValue,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecture {
    pub title: String,
    #[serde(default)]
    pub duration_minutes: i32,
}

impl Course {
    pub fn parsed_lectures(&self) -> Vec<Lecture> {
        serde_json::from_value(self.lectures.clone()).unwrap_or_default()
    }

    pub fn objective_list(&self) -> Vec<String> {
        self.objectives
            .clone()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    pub fn total_duration_minutes(&self) -> i64 {
        self.parsed_lectures()
            .iter()
            .map(|l| l.duration_minutes as i64)
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseProgress {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub lectures_viewed: i32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
