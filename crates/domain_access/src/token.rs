//! Bearer token verification and issuance
//!
//! Tokens are HS256 JWTs carrying `{ sub, email, role, iat, exp }`. Expiry is
//! checked against an injected [`Clock`] instead of the library's wall-clock
//! check, so verification is a function of the token and the clock alone.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use core_kernel::{Clock, SubjectId};

use crate::error::{AccessError, InvalidTokenReason};
use crate::session::{Role, Session};

/// JWT claims as issued by the login service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User's email address
    #[serde(default)]
    pub email: String,
    /// Portal role, one of `claimer`, `reviewer`, `admin`
    pub role: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Validates bearer tokens and produces [`Session`]s
pub struct SessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionVerifier {
    /// Creates a verifier for tokens signed with `secret`
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against `clock` in `verify`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            leeway: Duration::zero(),
            clock,
        }
    }

    /// Tolerates clock skew between issuer and verifier
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Verifies the value of an `Authorization` header
    ///
    /// Expects the `Bearer <token>` scheme; the scheme name is case-insensitive.
    pub fn verify_authorization_header(&self, header: Option<&str>) -> Result<Session, AccessError> {
        let header = header.map(str::trim).filter(|h| !h.is_empty());
        let Some(header) = header else {
            return Err(InvalidTokenReason::Missing.into());
        };

        match header.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => self.verify(token),
            _ => {
                warn!("Authorization header does not use the Bearer scheme");
                Err(InvalidTokenReason::Malformed.into())
            }
        }
    }

    /// Verifies a raw token
    ///
    /// # Errors
    ///
    /// `AccessError::InvalidToken` when the token is absent, malformed, fails
    /// the signature check, is expired, or names an unknown role.
    pub fn verify(&self, token: &str) -> Result<Session, AccessError> {
        match self.decode_session(token.trim()) {
            Ok(session) => {
                debug!(subject = %session.subject_id, role = %session.role, "Session verified");
                Ok(session)
            }
            Err(reason) => {
                warn!(reason = %reason, "Token rejected");
                Err(AccessError::InvalidToken(reason))
            }
        }
    }

    fn decode_session(&self, token: &str) -> Result<Session, InvalidTokenReason> {
        if token.is_empty() {
            return Err(InvalidTokenReason::Missing);
        }

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?
            .claims;

        let role: Role = claims.role.parse().map_err(InvalidTokenReason::UnknownRole)?;
        let subject_id = SubjectId::new(claims.sub).map_err(|_| InvalidTokenReason::Malformed)?;
        let issued_at = timestamp(claims.iat)?;
        let expires_at = timestamp(claims.exp)?;
        if expires_at <= issued_at {
            return Err(InvalidTokenReason::Malformed);
        }

        let session = Session {
            subject_id,
            email: claims.email,
            role,
            issued_at,
            expires_at,
        };
        if session.is_expired_at(self.clock.now() - self.leeway) {
            return Err(InvalidTokenReason::Expired);
        }
        Ok(session)
    }
}

impl fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("algorithm", &"HS256")
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}

fn classify(kind: &ErrorKind) -> InvalidTokenReason {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => InvalidTokenReason::BadSignature,
        ErrorKind::ExpiredSignature => InvalidTokenReason::Expired,
        _ => InvalidTokenReason::Malformed,
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, InvalidTokenReason> {
    DateTime::from_timestamp(secs, 0).ok_or(InvalidTokenReason::Malformed)
}

/// Signs session tokens in the format [`SessionVerifier`] accepts
///
/// The claims core never issues tokens itself; this exists for the login
/// service, local tooling, and tests.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            ttl,
            clock,
        }
    }

    /// Issues a token for `subject` valid for the configured lifetime
    pub fn issue(&self, subject: &SubjectId, email: &str, role: Role) -> Result<String, AccessError> {
        let now = self.clock.now();
        let claims = TokenClaims {
            sub: subject.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    /// Signs arbitrary claims
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, AccessError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AccessError::Issuance(e.to_string()))
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
