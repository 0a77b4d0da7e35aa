/// JWT token generation and validation
///
/// Tokens are signed with HS256 and bind a user to exactly one tenant.
///
/// # Token Types
///
/// - **Access Token**: sent as `Authorization: Bearer <token>` on every
///   request (default 24h, configurable)
/// - **Refresh Token**: exchanged for a new access token (30d)
///
/// The `role` claim is informational for clients. The server re-reads the
/// role from the database on every request, so a demoted admin loses admin
/// rights before their token expires.
///
/// # Example
///
/// ```
/// use tenantboard_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use tenantboard_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::new(user_id, Uuid::new_v4(), UserRole::User, TokenType::Access);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Value of the `iss` claim
pub const ISSUER: &str = "tenantboard";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// A refresh token was presented where an access token is required, or
    /// the other way round
    #[error("Expected {expected} token")]
    WrongTokenType { expected: &'static str },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    /// Default lifetime
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims
///
/// Standard claims `sub`, `iss`, `iat`, `exp`, `nbf` plus the tenant binding,
/// the role at issue time and the token type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,

    /// Always [`ISSUER`]
    pub iss: String,

    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,

    /// Tenant the session is bound to
    pub tenant_id: Uuid,

    /// Role when the token was issued
    pub role: UserRole,

    pub token_type: TokenType,
}

impl Claims {
    /// Creates claims with the default lifetime for the token type
    pub fn new(user_id: Uuid, tenant_id: Uuid, role: UserRole, token_type: TokenType) -> Self {
        Self::with_expiration(
            user_id,
            tenant_id,
            role,
            token_type,
            token_type.default_expiration(),
        )
    }

    /// Creates claims with a custom lifetime
    pub fn with_expiration(
        user_id: Uuid,
        tenant_id: Uuid,
        role: UserRole,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            tenant_id,
            role,
            token_type,
        }
    }
}

/// Access and refresh token issued together at login or registration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,

    /// Always `"Bearer"`
    pub token_type: &'static str,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Signs claims with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Issues an access token with the given lifetime and a refresh token
pub fn issue_token_pair(
    user_id: Uuid,
    tenant_id: Uuid,
    role: UserRole,
    secret: &str,
    access_ttl: Duration,
) -> Result<TokenPair, JwtError> {
    let access = Claims::with_expiration(user_id, tenant_id, role, TokenType::Access, access_ttl);
    let refresh = Claims::new(user_id, tenant_id, role, TokenType::Refresh);

    Ok(TokenPair {
        access_token: create_token(&access, secret)?,
        refresh_token: create_token(&refresh, secret)?,
        token_type: "Bearer",
        expires_in: access_ttl.num_seconds(),
    })
}

/// Verifies signature, expiry, not-before and issuer
///
/// # Errors
///
/// - `JwtError::Expired` for an expired token
/// - `JwtError::InvalidIssuer` for a token from another issuer
/// - `JwtError::ValidationError` for any other failure (bad signature,
///   malformed token)
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
            _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
        })
}

/// Validates a token and requires `token_type == Access`
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    expect_type(validate_token(token, secret)?, TokenType::Access)
}

/// Validates a token and requires `token_type == Refresh`
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    expect_type(validate_token(token, secret)?, TokenType::Refresh)
}

fn expect_type(claims: Claims, expected: TokenType) -> Result<Claims, JwtError> {
    if claims.token_type != expected {
        return Err(JwtError::WrongTokenType {
            expected: expected.as_str(),
        });
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn access_claims() -> Claims {
        Claims::new(Uuid::new_v4(), Uuid::new_v4(), UserRole::User, TokenType::Access)
    }

    #[test]
    fn test_token_type_expiration() {
        assert_eq!(TokenType::Access.default_expiration(), Duration::hours(24));
        assert_eq!(TokenType::Refresh.default_expiration(), Duration::days(30));
    }

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();

        let claims = Claims::new(user_id, tenant_id, UserRole::Admin, TokenType::Access);

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.tenant_id, tenant_id);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.iss, ISSUER);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_custom_expiration() {
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UserRole::User,
            TokenType::Access,
            Duration::hours(1),
        );

        let left = claims.exp - Utc::now().timestamp();
        assert!(left > 3500 && left <= 3600);
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = access_claims();
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, claims.sub);
        assert_eq!(validated.tenant_id, claims.tenant_id);
        assert_eq!(validated.role, UserRole::User);
        assert_eq!(validated.token_type, TokenType::Access);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = create_token(&access_claims(), SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, "another-secret-key-at-least-32-bytes"),
            Err(JwtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UserRole::User,
            TokenType::Access,
            Duration::seconds(-3600),
        );
        assert!(claims.exp < Utc::now().timestamp());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_foreign_issuer() {
        let mut claims = access_claims();
        claims.iss = "someone-else".to_string();

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_validate_garbage() {
        assert!(validate_token("not.a.jwt", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
    }

    #[test]
    fn test_access_and_refresh_are_not_interchangeable() {
        let pair = issue_token_pair(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UserRole::Admin,
            SECRET,
            Duration::hours(2),
        )
        .unwrap();

        assert!(validate_access_token(&pair.access_token, SECRET).is_ok());
        assert!(validate_refresh_token(&pair.refresh_token, SECRET).is_ok());

        assert!(matches!(
            validate_access_token(&pair.refresh_token, SECRET),
            Err(JwtError::WrongTokenType { expected: "access" })
        ));
        assert!(matches!(
            validate_refresh_token(&pair.access_token, SECRET),
            Err(JwtError::WrongTokenType { expected: "refresh" })
        ));
    }

    #[test]
    fn test_token_pair_uses_access_ttl() {
        let pair = issue_token_pair(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UserRole::User,
            SECRET,
            Duration::hours(2),
        )
        .unwrap();

        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 7200);

        let claims = validate_access_token(&pair.access_token, SECRET).unwrap();
        assert!(claims.exp - claims.iat <= 7200);
    }
}
