use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::assessment_dto::{
    AlreadyPassedResponse, CompletionQuizResponse, PerQuestionFeedback, QuestionView,
    QuizSummary, StartAttemptRequest, StartAttemptResponse, StudentQuery, SubmitAttemptRequest,
    SubmitAttemptResponse,
};
use crate::error::{Error, Result};
use crate::models::question::QuestionDetails;
use crate::AppState;

/// Entry point for the completion flow: returns the quiz (creating it lazily
/// on the first fully-completed student), an already-passed summary, or a
/// prerequisite error carrying lecture-progress counters.
#[axum::debug_handler]
pub async fn get_completion_quiz(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Query(query): Query<StudentQuery>,
) -> Result<Response> {
    let course = state.course_service.get_course(course_id).await?;

    let (viewed, total) = state
        .course_service
        .lecture_progress(query.student_id, &course)
        .await?;
    if viewed < total {
        return Err(Error::PrerequisiteNotMet { viewed, total });
    }

    if let Some(cert) = state
        .certificate_service
        .find_by_pair(query.student_id, course.id)
        .await?
    {
        let response = AlreadyPassedResponse {
            already_passed: true,
            certificate_id: cert.certificate_id,
            score_percent: cert.score_percent.to_string().parse().unwrap_or(0.0),
            issue_date: cert.issue_date,
        };
        return Ok(Json(response).into_response());
    }

    let quiz = state
        .quiz_service
        .get_or_create_completion_quiz(&course)
        .await?;

    let attempts_used = state
        .attempt_service
        .count_attempts(quiz.id, query.student_id)
        .await?;
    let in_progress = state
        .attempt_service
        .find_in_progress(quiz.id, query.student_id)
        .await?;

    let questions = QuestionView::list_from_quiz(&quiz);
    let response = CompletionQuizResponse {
        quiz: QuizSummary {
            id: quiz.id,
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            time_limit_minutes: quiz.time_limit_minutes,
            attempt_limit: quiz.attempt_limit,
            passing_score: quiz.passing_score_f64(),
            total_points: quiz.total_points,
            total_questions: questions.len(),
            questions,
        },
        attempts_used,
        attempts_remaining: (quiz.attempt_limit as i64 - attempts_used).max(0),
        in_progress_attempt_id: in_progress.map(|a| a.id),
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn start_attempt(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(req): Json<StartAttemptRequest>,
) -> Result<Response> {
    req.validate()?;
    let quiz = state.quiz_service.get_quiz_by_id(quiz_id).await?;

    let existing = state
        .attempt_service
        .find_in_progress(quiz.id, req.student_id)
        .await?;
    let resumed = existing.is_some();

    let attempt = state.attempt_service.start(&quiz, req.student_id).await?;
    tracing::info!(
        attempt_id = %attempt.id,
        attempt_number = attempt.attempt_number,
        resumed,
        "Attempt started"
    );

    let response = StartAttemptResponse {
        attempt_id: attempt.id,
        attempt_number: attempt.attempt_number,
        status: attempt.status,
        started_at: attempt.started_at,
        time_limit_minutes: quiz.time_limit_minutes,
        resumed,
    };
    Ok(Json(response).into_response())
}

/// Explicitly gives up an open attempt. The slot stays consumed; the
/// attempt count still includes abandoned attempts.
#[axum::debug_handler]
pub async fn abandon_attempt(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> Result<Response> {
    let attempt = state.attempt_service.abandon(attempt_id).await?;
    tracing::info!(attempt_id = %attempt.id, "Attempt abandoned");
    Ok(Json(serde_json::json!({
        "attempt_id": attempt.id,
        "status": attempt.status,
    }))
    .into_response())
}

/// Grades the submission, and on a passing score issues the certificate
/// idempotently before responding.
#[axum::debug_handler]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<Response> {
    req.validate()?;

    let attempt = state.attempt_service.get_attempt_by_id(attempt_id).await?;
    let quiz = state.quiz_service.get_quiz_by_id(attempt.quiz_id).await?;

    let (graded, outcome) = state
        .attempt_service
        .submit(attempt_id, &quiz, &req.answers)
        .await?;

    let certificate_id = if outcome.passed {
        let student = state.course_service.get_user(graded.student_id).await?;
        let course = state.course_service.get_course(graded.course_id).await?;
        let instructor = state.course_service.get_user(course.instructor_id).await?;
        let cert = state
            .certificate_service
            .issue_if_passed(&student, &course, &instructor.name, &graded)
            .await?;
        Some(cert.certificate_id)
    } else {
        None
    };

    let feedback = if quiz.show_correct_answers || quiz.allow_review {
        let questions = quiz.parsed_questions();
        Some(
            outcome
                .graded
                .iter()
                .map(|record| {
                    let correct_answer = if quiz.show_correct_answers {
                        questions
                            .iter()
                            .find(|q| q.id == record.question_id)
                            .and_then(|q| match &q.details {
                                QuestionDetails::Choice { .. } => {
                                    q.correct_option().map(|(_, o)| o.text.clone())
                                }
                                QuestionDetails::FreeText { correct_answer } => {
                                    Some(correct_answer.clone())
                                }
                                QuestionDetails::Essay {} => None,
                            })
                    } else {
                        None
                    };
                    PerQuestionFeedback {
                        question_id: record.question_id,
                        is_correct: record.is_correct,
                        points_awarded: record.points_awarded,
                        feedback: record.feedback.clone(),
                        correct_answer,
                    }
                })
                .collect(),
        )
    } else {
        None
    };

    let attempts_used = state
        .attempt_service
        .count_attempts(quiz.id, graded.student_id)
        .await?;

    let response = SubmitAttemptResponse {
        attempt_id: graded.id,
        status: graded.status,
        passed: outcome.passed,
        score_percent: outcome.score_percent,
        points_earned: outcome.points_earned,
        points_possible: outcome.points_possible,
        attempts_used,
        attempts_remaining: (quiz.attempt_limit as i64 - attempts_used).max(0),
        feedback,
        certificate_id,
    };
    Ok(Json(response).into_response())
}
