// JWT token generation and validation service

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{error::AuthError, models::Role};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user_id
    pub email: String,
    pub name: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Token service for JWT operations
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_duration: i64, // in seconds
}

impl TokenService {
    pub fn new(secret: &str, access_token_duration: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_duration,
        }
    }

    /// Lifetime of issued access tokens in seconds
    pub fn access_token_duration(&self) -> i64 {
        self.access_token_duration
    }

    /// Generate an access token for a staff member
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
        role: Role,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            name: name.to_string(),
            role,
            iat: now,
            exp: now + self.access_token_duration,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Validate an access token and return its claims
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &str = "test_secret_key_for_testing_purposes";

    fn test_token_service() -> TokenService {
        TokenService::new(SECRET, 604_800)
    }

    #[test]
    fn test_round_trip_preserves_identity() {
        let service = test_token_service();
        let user_id = Uuid::new_v4();
        let token = service
            .generate_access_token(user_id, "reception@test.com", "Reception Staff", Role::Reception)
            .unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "reception@test.com");
        assert_eq!(claims.name, "Reception Staff");
        assert_eq!(claims.role, Role::Reception);
        assert_eq!(claims.exp - claims.iat, 604_800);
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "manager@test.com".into(),
            name: "Hotel Manager".into(),
            role: Role::Manager,
            iat: now - 1000,
            exp: now - 500,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = test_token_service().validate_access_token(&token);
        assert!(matches!(result, Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let other = TokenService::new("another_secret_key_that_is_long_enough", 60);
        let token = other
            .generate_access_token(Uuid::new_v4(), "a@b.com", "A", Role::Manager)
            .unwrap();
        let result = test_token_service().validate_access_token(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    proptest! {
        #[test]
        fn prop_malformed_tokens_rejected(garbage in "[a-zA-Z0-9._-]{0,64}") {
            let result = test_token_service().validate_access_token(&garbage);
            prop_assert!(result.is_err());
        }
    }
}
