/// User model and database operations
///
/// A user belongs to exactly one tenant. Email addresses are unique within a
/// tenant (the same address may exist in two tenants) and are stored trimmed
/// and lowercased. Passwords are stored as Argon2id hashes only.
///
/// # Example
///
/// ```no_run
/// use tenantboard_shared::models::user::{CreateUser, User, UserRole};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, tenant_id: Uuid) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         tenant_id,
///         email: "Jane@Example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         full_name: "Jane Doe".to_string(),
///         role: UserRole::User,
///     },
/// )
/// .await?;
///
/// assert_eq!(user.email, "jane@example.com");
///
/// let found = User::find_by_email_and_tenant(&pool, "jane@example.com", tenant_id).await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Name of the per-tenant unique constraint on `users.email`
pub const EMAIL_CONSTRAINT: &str = "users_tenant_email_key";

/// Role of a user within their tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Manages projects and users of the tenant
    Admin,

    /// Works on projects and tasks
    #[default]
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    /// Checks if this role satisfies the required role
    ///
    /// Hierarchy: Admin > User
    pub fn has_permission(&self, required: &UserRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            UserRole::Admin => 2,
            UserRole::User => 1,
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    /// Owning tenant
    pub tenant_id: Uuid,

    /// Lowercased email, unique within the tenant
    pub email: String,

    /// Argon2id PHC string; never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub full_name: String,

    pub role: UserRole,

    /// Inactive users cannot log in and their tokens are rejected
    pub is_active: bool,

    pub last_login_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub tenant_id: Uuid,

    /// Normalized on insert
    pub email: String,

    /// Argon2id hash, NOT the plaintext password
    pub password_hash: String,

    pub full_name: String,

    pub role: UserRole,
}

/// Trims and lowercases an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

const USER_COLUMNS: &str = "id, tenant_id, email, password_hash, full_name, role, is_active, \
                            last_login_at, created_at, updated_at";

impl User {
    /// Inserts a user into a tenant
    ///
    /// # Errors
    ///
    /// Fails on the [`EMAIL_CONSTRAINT`] unique violation when the email is
    /// already registered in this tenant.
    pub async fn create<'e, E>(executor: E, data: CreateUser) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (tenant_id, email, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.tenant_id)
        .bind(normalize_email(&data.email))
        .bind(data.password_hash)
        .bind(data.full_name.trim().to_string())
        .bind(data.role)
        .fetch_one(executor)
        .await
    }

    /// Finds a user by ID within a tenant
    ///
    /// A user of another tenant is reported as `None`.
    pub async fn find_by_id_and_tenant<'e, E>(
        executor: E,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await
    }

    /// Finds a user by email within a tenant
    pub async fn find_by_email_and_tenant<'e, E>(
        executor: E,
        email: &str,
        tenant_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND tenant_id = $2"
        ))
        .bind(normalize_email(email))
        .bind(tenant_id)
        .fetch_optional(executor)
        .await
    }

    /// Lists all users of a tenant, oldest first
    pub async fn list_by_tenant<'e, E>(
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE tenant_id = $1 ORDER BY created_at ASC"
        ))
        .bind(tenant_id)
        .fetch_all(executor)
        .await
    }

    /// Counts users of a tenant
    pub async fn count_by_tenant<'e, E>(executor: E, tenant_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(executor)
            .await
    }

    /// Records a successful login
    pub async fn update_last_login<'e, E>(
        executor: E,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            "UPDATE users SET last_login_at = NOW() WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .execute(executor)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(UserRole::Admin.has_permission(&UserRole::Admin));
        assert!(UserRole::Admin.has_permission(&UserRole::User));
        assert!(UserRole::User.has_permission(&UserRole::User));
        assert!(!UserRole::User.has_permission(&UserRole::Admin));
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::User.as_str(), "user");
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            full_name: "Jane".to_string(),
            role: UserRole::Admin,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["tenantId"], user.tenant_id.to_string());
        assert_eq!(json["role"], "admin");
    }
}
