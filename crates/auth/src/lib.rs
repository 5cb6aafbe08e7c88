//! `eventhub-auth` — credentials and ownership policy.
//!
//! Decoupled from HTTP and storage: callers hand in tokens, hashes and
//! already-loaded entities.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;

pub use authorize::{AuthzError, EventAction, authorize_event_mutation, can_mutate_event};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{DEFAULT_TOKEN_TTL_HOURS, Hs256Jwt, JwtValidator, TokenIssueError};
pub use password::{PasswordError, hash_password, verify_password};
