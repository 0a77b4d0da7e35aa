//! Input checks that `validator` derives do not cover.

/// Subdomains that would collide with infrastructure hostnames
pub const RESERVED_SUBDOMAINS: &[&str] = &["www", "api", "admin", "app", "mail", "static"];

/// Trims and lowercases a subdomain
pub fn normalize_subdomain(subdomain: &str) -> String {
    subdomain.trim().to_ascii_lowercase()
}

/// Validates a normalized subdomain
///
/// Rules: 3 to 63 characters of `a-z`, `0-9` and `-`, no leading or trailing
/// hyphen, not reserved.
///
/// # Example
///
/// ```
/// use tenantboard_shared::validation::validate_subdomain;
///
/// assert!(validate_subdomain("acme-corp").is_ok());
/// assert!(validate_subdomain("-acme").is_err());
/// assert!(validate_subdomain("www").is_err());
/// ```
pub fn validate_subdomain(subdomain: &str) -> Result<(), String> {
    if subdomain.len() < 3 || subdomain.len() > 63 {
        return Err("Subdomain must be between 3 and 63 characters".to_string());
    }

    if !subdomain
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(
            "Subdomain may only contain lowercase letters, digits and hyphens".to_string(),
        );
    }

    if subdomain.starts_with('-') || subdomain.ends_with('-') {
        return Err("Subdomain must not start or end with a hyphen".to_string());
    }

    if RESERVED_SUBDOMAINS.contains(&subdomain) {
        return Err(format!("Subdomain '{}' is reserved", subdomain));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_subdomain() {
        assert_eq!(normalize_subdomain("  Acme-Corp "), "acme-corp");
    }

    #[test]
    fn test_valid_subdomains() {
        for subdomain in ["acme", "acme-corp", "team42", "a1b"] {
            assert!(
                validate_subdomain(subdomain).is_ok(),
                "'{}' should be valid",
                subdomain
            );
        }
    }

    #[test]
    fn test_subdomain_length() {
        assert!(validate_subdomain("ab").unwrap_err().contains("between 3 and 63"));
        assert!(validate_subdomain(&"a".repeat(64)).is_err());
        assert!(validate_subdomain(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn test_subdomain_characters() {
        assert!(validate_subdomain("acme_corp").is_err());
        assert!(validate_subdomain("acme.corp").is_err());
        assert!(validate_subdomain("Acme").is_err());
        assert!(validate_subdomain("acmé").is_err());
    }

    #[test]
    fn test_subdomain_hyphens() {
        assert!(validate_subdomain("-acme").unwrap_err().contains("hyphen"));
        assert!(validate_subdomain("acme-").is_err());
    }

    #[test]
    fn test_reserved_subdomains() {
        assert!(validate_subdomain("admin").unwrap_err().contains("reserved"));
        assert!(validate_subdomain("static").is_err());
    }
}
