use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    /// 1-based, strictly increasing per (quiz, student), never reused.
    pub attempt_number: i32,
    pub answers: Option<JsonValue>,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub graded_at: Option<DateTime<Utc>>,
    pub score_percent: Option<rust_decimal::Decimal>,
    pub points_earned: Option<f64>,
    pub points_possible: Option<f64>,
    pub passed: Option<bool>,
    pub feedback: Option<String>,
    pub time_spent_seconds: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl QuizAttempt {
    pub fn parsed_status(&self) -> AttemptStatus {
        AttemptStatus::parse(&self.status)
    }
}

/// Lifecycle: in_progress -> submitted -> graded, with abandoned as a
/// terminal escape hatch. Grading runs synchronously inside submit, so the
/// submitted state is transient and never observed at rest in normal flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
    Graded,
    Abandoned,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "in_progress",
            AttemptStatus::Submitted => "submitted",
            AttemptStatus::Graded => "graded",
            AttemptStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "in_progress" => AttemptStatus::InProgress,
            "submitted" => AttemptStatus::Submitted,
            "abandoned" => AttemptStatus::Abandoned,
            _ => AttemptStatus::Graded,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptStatus::Graded | AttemptStatus::Abandoned)
    }
}

/// One per-question answer record, stored in the attempt's answers JSONB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: i32,
    #[serde(default)]
    pub answer: JsonValue,
    /// None means "not gradable automatically" (essay), not "wrong".
    pub is_correct: Option<bool>,
    #[serde(default)]
    pub points_awarded: f64,
    #[serde(default)]
    pub time_spent_seconds: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl AnswerRecord {
    pub fn unanswered(question_id: i32) -> Self {
        Self {
            question_id,
            answer: JsonValue::Null,
            is_correct: None,
            points_awarded: 0.0,
            time_spent_seconds: 0,
            feedback: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for s in ["in_progress", "submitted", "graded", "abandoned"] {
            assert_eq!(AttemptStatus::parse(s).as_str(), s);
        }
    }

    #[test]
    fn terminal_states() {
        assert!(AttemptStatus::Graded.is_terminal());
        assert!(AttemptStatus::Abandoned.is_terminal());
        assert!(!AttemptStatus::InProgress.is_terminal());
        assert!(!AttemptStatus::Submitted.is_terminal());
    }
}
