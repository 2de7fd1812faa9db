use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
};

use crate::dto::assessment_dto::CertificateVerificationResponse;
use crate::AppState;

/// Public, unauthenticated verification endpoint for certificate links.
/// Read-only: verification never mutates the certificate.
#[axum::debug_handler]
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(certificate_id): Path<String>,
) -> crate::error::Result<Response> {
    let (cert, valid) = state.certificate_service.verify(&certificate_id).await?;

    let response = CertificateVerificationResponse {
        certificate_id: cert.certificate_id,
        student_name: cert.student_name,
        course_name: cert.course_name,
        instructor_name: cert.instructor_name,
        score_percent: cert.score_percent.to_string().parse().unwrap_or(0.0),
        completion_date: cert.completion_date,
        issue_date: cert.issue_date,
        expiry_date: cert.expiry_date,
        course_duration: cert.course_duration,
        status: cert.status,
        valid,
    };
    Ok(Json(response).into_response())
}
