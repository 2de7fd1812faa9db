use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Discriminator for the per-course singleton completion quiz.
pub const QUIZ_TYPE_COMPLETION: &str = "completion";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: Uuid,
    pub course_id: Uuid,
    pub instructor_id: Uuid,
    pub lecture_id: Option<Uuid>,
    pub quiz_type: String,
    pub title: String,
    pub description: Option<String>,
    /// Snapshot of the question list, fixed at creation so quiz content is
    /// stable across students; `total_points` is computed from it.
    pub questions: JsonValue,
    pub time_limit_minutes: Option<i32>,
    pub attempt_limit: i32,
    pub passing_score: rust_decimal::Decimal,
    pub show_correct_answers: bool,
    pub shuffle_questions: bool,
    pub shuffle_options: bool,
    pub allow_review: bool,
    pub available_from: Option<DateTime<Utc>>,
    pub available_until: Option<DateTime<Utc>>,
    pub total_points: f64,
    pub is_published: bool,
    pub is_required: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn parsed_questions(&self) -> Vec<crate::models::question::Question> {
        serde_json::from_value(self.questions.clone()).unwrap_or_default()
    }

    pub fn passing_score_f64(&self) -> f64 {
        self.passing_score.to_string().parse::<f64>().unwrap_or(0.0)
    }
}
