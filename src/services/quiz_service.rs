use crate::error::Result;
use crate::models::course::Course;
use crate::models::quiz::{Quiz, QUIZ_TYPE_COMPLETION};
use crate::services::generator_service::{CourseMetadata, QuestionGenerator};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Fixed settings for the certificate-gating completion quiz.
const COMPLETION_TIME_LIMIT_MINUTES: i32 = 30;
const COMPLETION_ATTEMPT_LIMIT: i32 = 3;
const COMPLETION_PASSING_SCORE: i64 = 35;

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
    generator: QuestionGenerator,
}

impl QuizService {
    pub fn new(pool: PgPool, generator: QuestionGenerator) -> Self {
        Self { pool, generator }
    }

    /// Lazily create the per-course completion quiz, memoized in storage.
    ///
    /// The quiz is located by (course_id, quiz_type); the unique index on that
    /// pair collapses concurrent first-completer creations to a single row.
    /// The loser's freshly generated questions are discarded.
    pub async fn get_or_create_completion_quiz(&self, course: &Course) -> Result<Quiz> {
        if let Some(existing) = self.find_completion_quiz(course.id).await? {
            return Ok(existing);
        }

        let meta = CourseMetadata::from(course);
        let count = crate::config::get_config().completion_quiz_questions;
        let questions = self.generator.generate(&meta, count).await;
        let total_points: f64 = questions.iter().map(|q| q.points).sum();
        let questions_json = serde_json::to_value(&questions)?;

        let inserted = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (
                course_id, instructor_id, lecture_id, quiz_type, title, description,
                questions, time_limit_minutes, attempt_limit, passing_score,
                show_correct_answers, shuffle_questions, shuffle_options, allow_review,
                available_from, available_until, total_points, is_published, is_required
            ) VALUES (
                $1, $2, NULL, $3, $4, $5,
                $6, $7, $8, $9,
                TRUE, TRUE, TRUE, TRUE,
                NULL, NULL, $10, TRUE, TRUE
            )
            RETURNING *
            "#,
        )
        .bind(course.id)
        .bind(course.instructor_id)
        .bind(QUIZ_TYPE_COMPLETION)
        .bind(format!("{}: Completion Quiz", course.title))
        .bind(format!(
            "Final assessment for \"{}\". Pass to earn your certificate.",
            course.title
        ))
        .bind(questions_json)
        .bind(COMPLETION_TIME_LIMIT_MINUTES)
        .bind(COMPLETION_ATTEMPT_LIMIT)
        .bind(Decimal::new(COMPLETION_PASSING_SCORE, 0))
        .bind(total_points)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(quiz) => {
                tracing::info!(quiz_id = %quiz.id, course_id = %course.id, "Created completion quiz");
                Ok(quiz)
            }
            // Lost the creation race: another request inserted first.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tracing::debug!(course_id = %course.id, "Completion quiz creation raced, reusing winner");
                self.find_completion_quiz(course.id)
                    .await?
                    .ok_or_else(|| crate::error::Error::Internal(
                        "Completion quiz vanished after unique-violation on insert".to_string(),
                    ))
            }
            Err(other) => Err(other.into()),
        }
    }

    pub async fn find_completion_quiz(&self, course_id: Uuid) -> Result<Option<Quiz>> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"SELECT * FROM quizzes WHERE course_id = $1 AND quiz_type = $2"#,
        )
        .bind(course_id)
        .bind(QUIZ_TYPE_COMPLETION)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quiz)
    }

    pub async fn get_quiz_by_id(&self, quiz_id: Uuid) -> Result<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>(r#"SELECT * FROM quizzes WHERE id = $1"#)
            .bind(quiz_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(quiz)
    }
}
