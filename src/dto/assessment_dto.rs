use crate::models::question::{Question, QuestionDetails, QuestionKind};
use crate::services::grading_service::SubmittedAnswer;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A question as served to students: no correct-answer flags, no canonical
/// answer strings, no explanations.
///
/// Option order may be shuffled, so clients should submit the option *text*
/// for choice questions; integer indexes refer to the stored order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: i32,
    pub kind: QuestionKind,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl QuestionView {
    pub fn from_question(q: &Question, shuffle_options: bool) -> Self {
        let options = match &q.details {
            QuestionDetails::Choice { options } => {
                let mut texts: Vec<String> = options.iter().map(|o| o.text.clone()).collect();
                // True/False stays in its conventional order.
                if shuffle_options && q.kind == QuestionKind::MultipleChoice {
                    texts.shuffle(&mut rand::thread_rng());
                }
                Some(texts)
            }
            _ => None,
        };
        Self {
            id: q.id,
            kind: q.kind,
            prompt: q.prompt.clone(),
            description: q.description.clone(),
            points: q.points,
            options,
        }
    }

    pub fn list_from_quiz(quiz: &crate::models::quiz::Quiz) -> Vec<Self> {
        let mut views: Vec<Self> = quiz
            .parsed_questions()
            .iter()
            .map(|q| Self::from_question(q, quiz.shuffle_options))
            .collect();
        if quiz.shuffle_questions {
            views.shuffle(&mut rand::thread_rng());
        }
        views
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub attempt_limit: i32,
    pub passing_score: f64,
    pub total_points: f64,
    pub total_questions: usize,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionQuizResponse {
    pub quiz: QuizSummary,
    pub attempts_used: i64,
    pub attempts_remaining: i64,
    /// Set when the student has an open attempt to resume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_progress_attempt_id: Option<Uuid>,
}

/// Returned instead of the quiz when the student already holds a certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlreadyPassedResponse {
    pub already_passed: bool,
    pub certificate_id: String,
    pub score_percent: f64,
    pub issue_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentQuery {
    pub student_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartAttemptRequest {
    pub student_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartAttemptResponse {
    pub attempt_id: Uuid,
    pub attempt_number: i32,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub time_limit_minutes: Option<i32>,
    pub resumed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(length(max = 200))]
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerQuestionFeedback {
    pub question_id: i32,
    pub is_correct: Option<bool>,
    pub points_awarded: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Present only when the quiz is configured to reveal correct answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAttemptResponse {
    pub attempt_id: Uuid,
    pub status: String,
    pub passed: bool,
    pub score_percent: f64,
    pub points_earned: f64,
    pub points_possible: f64,
    pub attempts_used: i64,
    pub attempts_remaining: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Vec<PerQuestionFeedback>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,
}

/// Public verification payload; requires no auth and mutates nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateVerificationResponse {
    pub certificate_id: String,
    pub student_name: String,
    pub course_name: String,
    pub instructor_name: String,
    pub score_percent: f64,
    pub completion_date: DateTime<Utc>,
    pub issue_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    pub course_duration: String,
    pub status: String,
    pub valid: bool,
}
