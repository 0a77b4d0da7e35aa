/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength checks
/// - [`jwt`]: JWT token generation and validation
/// - [`context`]: Typed per-request authentication context
/// - [`authorization`]: Role checks
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing, issuer and expiry checks
/// - **Tenant binding**: every token names exactly one tenant; the session
///   never switches tenants
///
/// # Example
///
/// ```no_run
/// use tenantboard_shared::auth::password::{hash_password, verify_password};
/// use tenantboard_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
/// use tenantboard_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Secr3t!pass")?;
/// assert!(verify_password("Secr3t!pass", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), UserRole::Admin, TokenType::Access);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// let verified = validate_access_token(&token, "secret-key-at-least-32-bytes-long!!")?;
/// assert_eq!(verified.role, UserRole::Admin);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod context;
pub mod jwt;
pub mod password;
