use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppError, models::Role};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// Issues and verifies the signed bearer tokens returned by login.
///
/// Tokens are stateless: nothing is persisted server-side and there is no
/// revocation list, so a token stays valid until it expires. The signing
/// secret is injected once at construction instead of being read from the
/// environment on every request.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Lifetime policy per role: admin sessions are privileged and kept
    /// short, everyone else gets a working day plus slack.
    fn lifetime(role: Role) -> Duration {
        match role {
            Role::Admin => Duration::hours(1),
            Role::Patient | Role::Doctor => Duration::hours(24),
        }
    }

    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Self::lifetime(role))
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to set expiration")))?;

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    /// Verify a bearer token and return the identity it encodes.
    ///
    /// Bad signature, malformed token, and expiry all fail identically. The
    /// referenced account is not looked up here; a stale token for a deleted
    /// account verifies until expiry and the downstream lookup 404s instead.
    pub fn verify(&self, token: &str) -> Result<(Uuid, Role), AppError> {
        let decoded = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| AppError::Unauthorized("invalid token".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("invalid token".into()))?;

        Ok((user_id, decoded.claims.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret")
    }

    #[test]
    fn issued_token_round_trips() {
        let tokens = service();
        let id = Uuid::new_v4();

        let token = tokens.issue(id, Role::Doctor).expect("issue token");
        let (decoded_id, decoded_role) = tokens.verify(&token).expect("verify token");

        assert_eq!(decoded_id, id);
        assert_eq!(decoded_role, Role::Doctor);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenService::new("other-secret")
            .issue(Uuid::new_v4(), Role::Patient)
            .expect("issue token");

        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Build a token whose expiry is beyond the default validation leeway.
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: Role::Admin,
            iat: (past - Duration::hours(1)).timestamp() as usize,
            exp: past.timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encode claims");

        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(service().verify("not-a-jwt").is_err());
    }

    #[test]
    fn token_with_non_uuid_subject_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: "doctor-42".into(),
            role: Role::Doctor,
            iat: now.timestamp() as usize,
            exp: (now + Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encode claims");

        assert!(service().verify(&token).is_err());
    }
}
