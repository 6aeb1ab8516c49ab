//! Session introspection DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use core_kernel::SubjectId;
use domain_access::{Role, Session};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub subject_id: SubjectId,
    pub email: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            subject_id: session.subject_id,
            email: session.email,
            role: session.role,
            issued_at: session.issued_at,
            expires_at: session.expires_at,
        }
    }
}
