use crate::error::{Error, Result};
use crate::models::attempt::QuizAttempt;
use crate::models::certificate::{Certificate, CERTIFICATE_STATUS_ACTIVE};
use crate::models::course::Course;
use crate::models::user::User;
use crate::utils::time::format_duration_minutes;
use crate::utils::token::generate_certificate_id;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Issues and verifies course-completion certificates.
///
/// Issuance is exactly-once per (student, course): the unique index is the
/// enforcement mechanism, and a duplicate-key insert is treated as the
/// idempotent-success path, never an error.
#[derive(Clone)]
pub struct CertificateService {
    pool: PgPool,
}

impl CertificateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_pair(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Certificate>> {
        let cert = sqlx::query_as::<_, Certificate>(
            r#"SELECT * FROM certificates WHERE student_id = $1 AND course_id = $2"#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cert)
    }

    pub async fn find_by_certificate_id(&self, certificate_id: &str) -> Result<Option<Certificate>> {
        let cert = sqlx::query_as::<_, Certificate>(
            r#"SELECT * FROM certificates WHERE certificate_id = $1"#,
        )
        .bind(certificate_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cert)
    }

    /// Issue a certificate for a passing attempt, or return the existing one.
    /// Display names and the duration string are snapshotted at issuance time
    /// so later profile or course edits never rewrite history.
    pub async fn issue_if_passed(
        &self,
        student: &User,
        course: &Course,
        instructor_name: &str,
        attempt: &QuizAttempt,
    ) -> Result<Certificate> {
        if !attempt.passed.unwrap_or(false) {
            return Err(Error::InvalidState(
                "Certificate requires a passing attempt".to_string(),
            ));
        }

        if let Some(existing) = self.find_by_pair(student.id, course.id).await? {
            tracing::debug!(certificate_id = %existing.certificate_id, "Certificate already issued");
            return Ok(existing);
        }

        let now = Utc::now();
        let completion_date = attempt.graded_at.unwrap_or(now);
        let duration = format_duration_minutes(course.total_duration_minutes());
        let score = attempt
            .score_percent
            .unwrap_or_else(|| rust_decimal::Decimal::new(0, 0));

        let inserted = sqlx::query_as::<_, Certificate>(
            r#"
            INSERT INTO certificates (
                certificate_id, student_id, course_id,
                student_name, course_name, instructor_name,
                score_percent, completion_date, issue_date, expiry_date,
                course_duration, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, $10, $11)
            RETURNING *
            "#,
        )
        .bind(generate_certificate_id())
        .bind(student.id)
        .bind(course.id)
        .bind(&student.name)
        .bind(&course.title)
        .bind(instructor_name)
        .bind(score)
        .bind(completion_date)
        .bind(now)
        .bind(duration)
        .bind(CERTIFICATE_STATUS_ACTIVE)
        .fetch_one(&self.pool)
        .await;

        let certificate = match inserted {
            Ok(cert) => {
                tracing::info!(
                    certificate_id = %cert.certificate_id,
                    student_id = %student.id,
                    course_id = %course.id,
                    "Certificate issued"
                );
                cert
            }
            // Concurrent passing submissions collapsed on the unique index;
            // the pre-existing record is the answer, not an error.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => self
                .find_by_pair(student.id, course.id)
                .await?
                .ok_or_else(|| {
                    Error::Internal("Certificate vanished after unique-violation on insert".to_string())
                })?,
            Err(other) => return Err(other.into()),
        };

        self.mark_progress_completed(student.id, course.id).await?;
        Ok(certificate)
    }

    async fn mark_progress_completed(&self, student_id: Uuid, course_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE course_progress
            SET completed = TRUE, completed_at = NOW(), updated_at = NOW()
            WHERE student_id = $1 AND course_id = $2 AND completed = FALSE
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Pure read: resolves a public certificate id and computes validity.
    pub async fn verify(&self, certificate_id: &str) -> Result<(Certificate, bool)> {
        let cert = self
            .find_by_certificate_id(certificate_id)
            .await?
            .ok_or_else(|| Error::NotFound("Certificate not found".to_string()))?;
        let valid = cert.is_valid(Utc::now());
        Ok((cert, valid))
    }
}
