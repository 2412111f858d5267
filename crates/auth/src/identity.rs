//! Bearer token → shopper identity.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;
use tracing::debug;

use storefront_core::UserId;

use crate::claims::{IdentityClaims, TokenValidationError, validate_claims};

/// An authenticated caller. Trusted completely downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Resolves a bearer credential to an [`Identity`].
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, IdentityError>;
}

/// HS256-signed JWTs carrying [`IdentityClaims`].
///
/// Expiry is checked against `issued_at`/`expires_at` by [`validate_claims`],
/// not the registered `exp` claim.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl IdentityProvider for Hs256JwtValidator {
    fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, IdentityError> {
        let data = jsonwebtoken::decode::<IdentityClaims>(token, &self.key, &self.validation).map_err(|e| {
            debug!(error = %e, "bearer token rejected");
            match e.kind() {
                ErrorKind::InvalidSignature => IdentityError::InvalidSignature,
                _ => IdentityError::Malformed(e.to_string()),
            }
        })?;

        validate_claims(&data.claims, now)?;

        Ok(Identity {
            user_id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};

    fn mint(secret: &str, claims: &IdentityClaims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn live_claims(now: DateTime<Utc>) -> IdentityClaims {
        IdentityClaims {
            sub: UserId::new(),
            email: Some("ana@example.com".to_string()),
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn resolves_a_valid_token() {
        let now = Utc::now();
        let claims = live_claims(now);
        let validator = Hs256JwtValidator::new("test-secret");

        let identity = validator.resolve(&mint("test-secret", &claims), now).unwrap();
        assert_eq!(identity.user_id, claims.sub);
        assert_eq!(identity.email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn wrong_secret_is_an_invalid_signature() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new("test-secret");
        let err = validator.resolve(&mint("other-secret", &live_claims(now)), now).unwrap_err();
        assert_eq!(err, IdentityError::InvalidSignature);
    }

    #[test]
    fn expired_claims_are_rejected_after_signature_check() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new("test-secret");
        let token = mint("test-secret", &live_claims(now));

        let err = validator.resolve(&token, now + Duration::hours(1)).unwrap_err();
        assert_eq!(err, IdentityError::Claims(TokenValidationError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        let validator = Hs256JwtValidator::new("test-secret");
        assert!(matches!(
            validator.resolve("not.a.jwt", Utc::now()),
            Err(IdentityError::Malformed(_))
        ));
    }
}
