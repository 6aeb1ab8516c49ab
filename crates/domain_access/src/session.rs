//! Roles and verified sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::SubjectId;

/// Portal role of an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Submits claims and reads their own claims
    Claimer,
    /// Works the manual-review queue and records decisions
    Reviewer,
    /// Full read access, statistics, and decisions
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Claimer, Role::Reviewer, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Claimer => "claimer",
            Role::Reviewer => "reviewer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a role claim, tolerating surrounding whitespace and letter case
///
/// Anything outside the three known roles is an error; there is no fallback role.
impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| s.to_string())
    }
}

/// Verified identity and role, valid for a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub subject_id: SubjectId,
    pub email: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        subject_id: SubjectId,
        email: impl Into<String>,
        role: Role,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_id,
            email: email.into(),
            role,
            issued_at,
            expires_at,
        }
    }

    /// True once `now` has reached the expiry instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_role_parsing_normalizes_case() {
        assert_eq!("reviewer".parse::<Role>(), Ok(Role::Reviewer));
        assert_eq!(" Admin ".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("CLAIMER".parse::<Role>(), Ok(Role::Claimer));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert_eq!("user".parse::<Role>(), Err("user".to_string()));
        assert!("".parse::<Role>().is_err());
        assert!("superadmin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Reviewer).unwrap(), "\"reviewer\"");
        let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, Role::Admin);
    }

    #[test]
    fn test_session_expiry_boundary() {
        let issued = Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap();
        let session = Session::new(
            SubjectId::new("u-1").unwrap(),
            "claimer@email.com",
            Role::Claimer,
            issued,
            issued + Duration::hours(1),
        );

        assert!(!session.is_expired_at(issued + Duration::minutes(59)));
        assert!(session.is_expired_at(issued + Duration::hours(1)));
    }
}
