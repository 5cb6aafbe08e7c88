use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use eventhub_core::UserId;

/// JWT claims carried by a bearer credential.
///
/// Timestamps are seconds since the Unix epoch, as registered JWT claims require.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the user id as a decimal string.
    pub sub: String,

    /// Issued-at.
    pub iat: i64,

    /// Expiration.
    pub exp: i64,
}

impl JwtClaims {
    pub fn for_user(user_id: UserId, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    pub fn user_id(&self) -> Result<UserId, TokenValidationError> {
        self.sub
            .parse()
            .map_err(|_| TokenValidationError::InvalidSubject)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token subject is not a user id")]
    InvalidSubject,

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Deterministically validate the claim time window against `now`.
///
/// Signature verification happens in [`crate::jwt`]; this checks claims only.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_half_open() {
        let now = Utc::now();
        let claims = JwtClaims::for_user(UserId::new(1), now, Duration::hours(1));

        assert_eq!(validate_claims(&claims, now), Ok(()));
        assert_eq!(
            validate_claims(&claims, now + Duration::hours(1)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims, now - Duration::minutes(5)),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let mut claims = JwtClaims::for_user(UserId::new(1), now, Duration::hours(1));
        claims.exp = claims.iat;
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn subject_round_trips_to_user_id() {
        let claims = JwtClaims::for_user(UserId::new(42), Utc::now(), Duration::days(7));
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id(), Ok(UserId::new(42)));

        let bogus = JwtClaims { sub: "ann".to_string(), ..claims };
        assert_eq!(bogus.user_id(), Err(TokenValidationError::InvalidSubject));
    }
}
