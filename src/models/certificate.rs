use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const CERTIFICATE_STATUS_ACTIVE: &str = "active";
pub const CERTIFICATE_STATUS_REVOKED: &str = "revoked";
pub const CERTIFICATE_STATUS_EXPIRED: &str = "expired";

/// Proof of completion. Display fields are denormalized at issuance time so
/// later profile or course edits never alter historical certificates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Certificate {
    pub id: Uuid,
    /// Opaque public token used in verification links. Random, not sequential.
    pub certificate_id: String,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub student_name: String,
    pub course_name: String,
    pub instructor_name: String,
    pub score_percent: rust_decimal::Decimal,
    pub completion_date: DateTime<Utc>,
    pub issue_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub course_duration: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Certificate {
    /// Verification is a pure read: active and not past expiry.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.status == CERTIFICATE_STATUS_ACTIVE
            && self.expiry_date.map(|exp| exp > now).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn certificate(status: &str, expiry: Option<DateTime<Utc>>) -> Certificate {
        Certificate {
            id: Uuid::new_v4(),
            certificate_id: "CERT-TESTTOKEN1234".to_string(),
            student_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            student_name: "Ada Lovelace".to_string(),
            course_name: "Intro to React".to_string(),
            instructor_name: "Grace Hopper".to_string(),
            score_percent: rust_decimal::Decimal::new(80, 0),
            completion_date: Utc::now(),
            issue_date: Utc::now(),
            expiry_date: expiry,
            course_duration: "3h 20m".to_string(),
            status: status.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn active_without_expiry_is_valid() {
        assert!(certificate(CERTIFICATE_STATUS_ACTIVE, None).is_valid(Utc::now()));
    }

    #[test]
    fn revoked_is_invalid() {
        assert!(!certificate(CERTIFICATE_STATUS_REVOKED, None).is_valid(Utc::now()));
    }

    #[test]
    fn past_expiry_is_invalid() {
        let now = Utc::now();
        let cert = certificate(CERTIFICATE_STATUS_ACTIVE, Some(now - Duration::days(1)));
        assert!(!cert.is_valid(now));
        let cert = certificate(CERTIFICATE_STATUS_ACTIVE, Some(now + Duration::days(1)));
        assert!(cert.is_valid(now));
    }
}
