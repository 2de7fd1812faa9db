use crate::error::Result;
use crate::models::course::{Course, CourseProgress};
use crate::models::user::User;
use sqlx::PgPool;
use uuid::Uuid;

/// Read-side collaborator for course metadata, lecture progress, and
/// display-name lookups. The assessment engine treats these as external
/// contracts; only the queries it needs live here.
#[derive(Clone)]
pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_course(&self, course_id: Uuid) -> Result<Course> {
        let course = sqlx::query_as::<_, Course>(r#"SELECT * FROM courses WHERE id = $1"#)
            .bind(course_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(course)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_progress(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<CourseProgress>> {
        let progress = sqlx::query_as::<_, CourseProgress>(
            r#"SELECT * FROM course_progress WHERE student_id = $1 AND course_id = $2"#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(progress)
    }

    /// (lectures viewed, lectures total) for the prerequisite check.
    pub async fn lecture_progress(
        &self,
        student_id: Uuid,
        course: &Course,
    ) -> Result<(i64, i64)> {
        let total = course.parsed_lectures().len() as i64;
        let viewed = self
            .get_progress(student_id, course.id)
            .await?
            .map(|p| p.lectures_viewed as i64)
            .unwrap_or(0);
        Ok((viewed.min(total), total))
    }
}
