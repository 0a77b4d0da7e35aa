/// Password hashing with Argon2id
///
/// # Parameters
///
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash, PHC string encoded with a random 16-byte salt
///
/// Verification reads the parameters from the stored PHC string, so hashes
/// produced with older parameters keep verifying after a change here.
///
/// # Example
///
/// ```
/// use tenantboard_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Corr3ct!Horse")?;
/// assert!(verify_password("Corr3ct!Horse", &hash)?);
/// assert!(!verify_password("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

const MEMORY_COST_KIB: u32 = 65536;
const TIME_COST: u32 = 3;
const PARALLELISM: u32 = 4;
const OUTPUT_LEN: usize = 32;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(MEMORY_COST_KIB)
        .t_cost(TIME_COST)
        .p_cost(PARALLELISM)
        .output_len(OUTPUT_LEN)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password into a PHC string
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC hash
///
/// A wrong password is `Ok(false)`; only a malformed hash or an internal
/// failure is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    if parsed.salt.is_none() || parsed.hash.is_none() {
        return Err(PasswordError::InvalidHash(
            "Hash is missing its salt or output".to_string(),
        ));
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Hash of a fixed password with the current parameters, computed once
fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| match hash_password("tenantboard-dummy-password") {
            Ok(hash) => Some(hash),
            Err(e) => {
                tracing::warn!(error = %e, "Dummy password hash failed");
                None
            }
        })
        .as_deref()
}

/// Runs one verification against a fixed hash and always fails
///
/// Called on login when the tenant or user does not exist so the response
/// time matches a wrong password for a real account.
pub fn verify_dummy(password: &str) -> bool {
    if let Some(hash) = dummy_hash() {
        let _ = verify_password(password, hash);
    }
    false
}

/// Checks minimum password strength
///
/// Requires at least [`MIN_PASSWORD_LENGTH`] characters including an
/// uppercase letter, a lowercase letter, a digit and a special character.
///
/// # Example
///
/// ```
/// use tenantboard_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("MyP@ssw0rd!").is_ok());
/// assert!(validate_password_strength("Sh0rt!").is_err());
/// assert!(validate_password_strength("Password123").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    let checks: [(fn(&char) -> bool, &str); 4] = [
        (|c| c.is_uppercase(), "an uppercase letter"),
        (|c| c.is_lowercase(), "a lowercase letter"),
        (|c| c.is_numeric(), "a digit"),
        (|c| !c.is_alphanumeric(), "a special character"),
    ];

    for (predicate, requirement) in checks {
        if !password.chars().any(|c| predicate(&c)) {
            return Err(format!("Password must contain at least {}", requirement));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_configured_parameters() {
        let hash = hash_password("Test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct_password").unwrap();

        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_unicode() {
        let hash = hash_password("pässwörd-密码").unwrap();
        assert!(verify_password("pässwörd-密码", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("password", "invalid_hash"),
            Err(PasswordError::InvalidHash(_))
        ));
        assert!(matches!(
            verify_password("password", "$argon2id$invalid"),
            Err(PasswordError::InvalidHash(_))
        ));
        assert!(verify_password("password", "$argon2id$v=19$m=65536,t=3,p=4").is_err());
    }

    #[test]
    fn test_verify_dummy_always_fails() {
        assert!(!verify_dummy("tenantboard-dummy-password"));
        assert!(!verify_dummy("anything"));
    }

    #[test]
    fn test_dummy_hash_is_computed_once() {
        let first = dummy_hash().expect("Dummy hash should succeed");
        let second = dummy_hash().expect("Dummy hash should succeed");

        // Same allocation: later calls only verify, they never hash again
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_dummy_hash_matches_real_hash_cost() {
        let dummy = PasswordHash::new(dummy_hash().unwrap()).unwrap();
        let real_hash = hash_password("Str0ng!Pass").unwrap();
        let real = PasswordHash::new(&real_hash).unwrap();

        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(dummy.version, real.version);
        assert_eq!(dummy.params, real.params);
    }

    #[test]
    fn test_password_strength_accepts_strong_passwords() {
        for password in ["MyP@ssw0rd!", "Str0ng!Pass", "C0mpl3x#Pwd"] {
            assert!(
                validate_password_strength(password).is_ok(),
                "Password '{}' should be valid",
                password
            );
        }
    }

    #[test]
    fn test_password_strength_reports_first_missing_requirement() {
        let cases = [
            ("Sh0rt!", "at least 8 characters"),
            ("lowercase1!", "uppercase letter"),
            ("UPPERCASE1!", "lowercase letter"),
            ("NoDigits!!", "digit"),
            ("NoSpecial123", "special character"),
        ];

        for (password, expected) in cases {
            let err = validate_password_strength(password).unwrap_err();
            assert!(
                err.contains(expected),
                "'{}' should fail with '{}', got '{}'",
                password,
                expected,
                err
            );
        }
    }

    #[test]
    fn test_password_strength_counts_characters_not_bytes() {
        // 7 characters, 11 bytes
        assert!(validate_password_strength("Äbc1!éü").is_err());
    }
}
