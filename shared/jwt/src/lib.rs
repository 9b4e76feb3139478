use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared_error::AppError;
use uuid::Uuid;

/// JWT claims for access tokens.
///
/// Token issuance lives in the identity collaborator; this crate only
/// validates tokens and surfaces the security context they carry.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,

    /// Tenant ID
    pub tenant_id: Uuid,

    /// Roles granted to the user
    #[serde(default)]
    pub roles: Vec<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, tenant_id: Uuid, roles: Vec<String>, expiration: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id,
            tenant_id,
            roles,
            iat: now,
            exp: now + expiration,
        }
    }
}

/// Encode claims into a signed JWT
pub fn encode_jwt(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::InternalError(format!("Failed to encode JWT: {}", e)))
}

/// Decode and validate a JWT, returning its claims
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_security_context() {
        let claims = Claims::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec!["warehouse_operator".to_string()],
            3600,
        );
        let token = encode_jwt(&claims, "test-secret").unwrap();
        let decoded = decode_jwt(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.tenant_id, claims.tenant_id);
        assert_eq!(decoded.roles, claims.roles);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), vec![], 3600);
        let token = encode_jwt(&claims, "secret-a").unwrap();
        assert!(matches!(decode_jwt(&token, "secret-b"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), vec![], -3600);
        let token = encode_jwt(&claims, "secret").unwrap();
        assert!(matches!(decode_jwt(&token, "secret"), Err(AppError::TokenExpired)));
    }
}
