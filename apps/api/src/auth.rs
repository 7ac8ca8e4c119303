//! Bearer token issuing and decoding.
//!
//! Tokens are HS256 JWTs carrying the user id and role. A token is the only
//! thing the access gate looks at; the role is not re-read from storage.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use pharmos_core::{AccessError, Role, Subject, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Role at issue time
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Issues a token for `user`, returning it with its expiry.
    pub fn issue(&self, user: &User) -> Result<(String, DateTime<Utc>), ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))?;

        Ok((token, exp))
    }

    /// Validates signature and expiry and yields the caller.
    pub fn decode(&self, token: &str) -> Result<Subject, AccessError> {
        let validation = Validation::default();

        let data: TokenData<Claims> = decode(token, &self.decoding, &validation)
            .map_err(|e| AccessError::Unauthenticated(format!("Invalid token: {}", e)))?;

        Ok(Subject::new(data.claims.sub, data.claims.role))
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: "user-001".to_string(),
            name: "Test".to_string(),
            email: "test@pharmos.local".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);

        let (token, expires_at) = manager.issue(&user(Role::Pharmacist)).unwrap();
        let subject = manager.decode(&token).unwrap();

        assert_eq!(subject.id, "user-001");
        assert_eq!(subject.role, Role::Pharmacist);
        assert!(expires_at > Utc::now());
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = JwtManager::new("secret-a", 3600);
        let verifier = JwtManager::new("secret-b", 3600);

        let (token, _) = issuer.issue(&user(Role::Admin)).unwrap();
        assert!(matches!(
            verifier.decode(&token),
            Err(AccessError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        // Past the default 60 s leeway
        let manager = JwtManager::new("test-secret", -120);

        let (token, _) = manager.issue(&user(Role::Superadmin)).unwrap();
        assert!(manager.decode(&token).is_err());
    }

    #[test]
    fn test_garbage_token() {
        let manager = JwtManager::new("test-secret", 3600);
        assert!(manager.decode("not.a.token").is_err());
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("abc123"), None);
    }
}
