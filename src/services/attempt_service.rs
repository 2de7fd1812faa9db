use crate::error::{Error, Result};
use crate::models::attempt::{AnswerRecord, AttemptStatus, QuizAttempt};
use crate::models::quiz::Quiz;
use crate::services::grading_service::{GradeOutcome, GradingService, SubmittedAnswer};
use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Drives the attempt lifecycle: in_progress -> submitted -> graded, with
/// abandoned as a terminal state. All coordination goes through storage
/// constraints; there is no in-process shared state across requests.
#[derive(Clone)]
pub struct AttemptService {
    pool: PgPool,
    grading: GradingService,
}

impl AttemptService {
    pub fn new(pool: PgPool, grading: GradingService) -> Self {
        Self { pool, grading }
    }

    pub async fn get_attempt_by_id(&self, attempt_id: Uuid) -> Result<QuizAttempt> {
        let attempt =
            sqlx::query_as::<_, QuizAttempt>(r#"SELECT * FROM quiz_attempts WHERE id = $1"#)
                .bind(attempt_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(attempt)
    }

    pub async fn count_attempts(&self, quiz_id: Uuid, student_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM quiz_attempts WHERE quiz_id = $1 AND student_id = $2"#,
        )
        .bind(quiz_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn find_in_progress(
        &self,
        quiz_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<QuizAttempt>> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"SELECT * FROM quiz_attempts
               WHERE quiz_id = $1 AND student_id = $2 AND status = $3
               ORDER BY attempt_number DESC LIMIT 1"#,
        )
        .bind(quiz_id)
        .bind(student_id)
        .bind(AttemptStatus::InProgress.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempt)
    }

    /// Idempotent start: an open attempt is resumed, never duplicated.
    /// Attempt numbers are strictly increasing per (quiz, student) and a new
    /// attempt beyond the quiz's limit is rejected before creation.
    pub async fn start(&self, quiz: &Quiz, student_id: Uuid) -> Result<QuizAttempt> {
        if let Some(open) = self.find_in_progress(quiz.id, student_id).await? {
            tracing::debug!(attempt_id = %open.id, "Resuming in-progress attempt");
            return Ok(open);
        }

        let used = self.count_attempts(quiz.id, student_id).await?;
        if used >= quiz.attempt_limit as i64 {
            return Err(Error::AttemptLimitExceeded {
                used,
                limit: quiz.attempt_limit,
            });
        }

        let questions = quiz.parsed_questions();
        let blank: Vec<AnswerRecord> = questions
            .iter()
            .map(|q| AnswerRecord::unanswered(q.id))
            .collect();
        let answers_json = serde_json::to_value(&blank)?;

        let inserted = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (
                quiz_id, student_id, course_id, attempt_number, answers, status, started_at
            )
            SELECT $1, $2, $3,
                   COALESCE(MAX(attempt_number), 0) + 1,
                   $4, $5, $6
            FROM quiz_attempts WHERE quiz_id = $1 AND student_id = $2
            RETURNING *
            "#,
        )
        .bind(quiz.id)
        .bind(student_id)
        .bind(quiz.course_id)
        .bind(answers_json)
        .bind(AttemptStatus::InProgress.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(attempt) => Ok(attempt),
            // Concurrent starts both computed the same next number; the
            // unique (quiz, student, attempt_number) index broke the tie.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                self.find_in_progress(quiz.id, student_id)
                    .await?
                    .ok_or_else(|| {
                        Error::Internal("Attempt creation raced but no open attempt found".to_string())
                    })
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Submit and grade in one step. Valid only from in_progress; the guarded
    /// UPDATE makes concurrent double-submits resolve to exactly one grading.
    /// Persisting score, answers, and timestamps is a single statement, so a
    /// submission is either fully graded or not recorded at all.
    pub async fn submit(
        &self,
        attempt_id: Uuid,
        quiz: &Quiz,
        answers: &[SubmittedAnswer],
    ) -> Result<(QuizAttempt, GradeOutcome)> {
        let attempt = self.get_attempt_by_id(attempt_id).await?;
        match attempt.parsed_status() {
            AttemptStatus::InProgress => {}
            other => {
                return Err(Error::InvalidState(format!(
                    "Attempt cannot be submitted from the '{}' state",
                    other.as_str()
                )));
            }
        }

        let questions = quiz.parsed_questions();
        let outcome = self
            .grading
            .grade(&questions, answers, quiz.passing_score_f64())
            .await;

        let now = Utc::now();
        let graded_json = serde_json::to_value(&outcome.graded)?;
        let score_dec =
            Decimal::from_f64(outcome.score_percent).unwrap_or_else(|| Decimal::new(0, 0));

        let updated = sqlx::query_as::<_, QuizAttempt>(
            r#"
            UPDATE quiz_attempts
            SET status = $1,
                answers = $2,
                submitted_at = $3,
                graded_at = $3,
                score_percent = $4,
                points_earned = $5,
                points_possible = $6,
                passed = $7,
                time_spent_seconds = ROUND(EXTRACT(EPOCH FROM ($3 - started_at)))::integer,
                updated_at = $3
            WHERE id = $8 AND status = $9
            RETURNING *
            "#,
        )
        .bind(AttemptStatus::Graded.as_str())
        .bind(graded_json)
        .bind(now)
        .bind(score_dec)
        .bind(outcome.points_earned)
        .bind(outcome.points_possible)
        .bind(outcome.passed)
        .bind(attempt_id)
        .bind(AttemptStatus::InProgress.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let updated = updated.ok_or_else(|| {
            Error::InvalidState("Attempt was graded concurrently".to_string())
        })?;

        tracing::info!(
            attempt_id = %updated.id,
            score = outcome.score_percent,
            passed = outcome.passed,
            "Attempt graded"
        );
        Ok((updated, outcome))
    }

    /// Explicit terminal escape hatch for an open attempt.
    pub async fn abandon(&self, attempt_id: Uuid) -> Result<QuizAttempt> {
        let updated = sqlx::query_as::<_, QuizAttempt>(
            r#"
            UPDATE quiz_attempts
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(AttemptStatus::Abandoned.as_str())
        .bind(attempt_id)
        .bind(AttemptStatus::InProgress.as_str())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| {
            Error::InvalidState("Only an in-progress attempt can be abandoned".to_string())
        })
    }
}
