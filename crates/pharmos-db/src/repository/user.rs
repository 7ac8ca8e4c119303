//! # User Repository
//!
//! Back-office accounts: the one-time superadmin bootstrap, credential
//! checks for login, and superadmin-only account management.
//!
//! Passwords are stored as Argon2 PHC strings. [`UserRecord`] carries the
//! hash and never leaves this crate's callers' trust boundary; everything
//! returned to the HTTP layer is a [`User`].

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pharmos_core::validation::{validate_new_user, validate_user_patch};
use pharmos_core::{CoreError, NewUser, Role, User, UserPatch, ValidationError};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

/// A stored account row, including the password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            name: record.name,
            email: record.email,
            role: record.role,
            created_at: record.created_at,
        }
    }
}

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates the single superadmin account.
    ///
    /// Fails with a validation error once any superadmin exists. The
    /// existence check and the insert are one statement.
    pub async fn bootstrap_superadmin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> DbResult<User> {
        let new = NewUser {
            name: name.trim().to_string(),
            email: normalize_email(email),
            password: password.to_string(),
            role: Role::Superadmin,
        };
        validate_new_user(&new)?;

        let record = self.build_record(&new)?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at)
            SELECT ?, ?, ?, ?, ?, ?
            WHERE NOT EXISTS (SELECT 1 FROM users WHERE role = 'superadmin')
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| email_conflict(e.into(), &record.email))?;

        if result.rows_affected() == 0 {
            return Err(ValidationError::Rule("a superadmin account already exists".to_string()).into());
        }

        info!(id = %record.id, "Superadmin account created");
        Ok(record.into())
    }

    /// Creates an `admin` or `pharmacist` account.
    pub async fn create(&self, new: &NewUser) -> DbResult<User> {
        if new.role == Role::Superadmin {
            return Err(assignable_roles_error());
        }

        let new = NewUser {
            name: new.name.trim().to_string(),
            email: normalize_email(&new.email),
            password: new.password.clone(),
            role: new.role,
        };
        validate_new_user(&new)?;

        let record = self.build_record(&new)?;
        debug!(id = %record.id, role = %record.role, "Creating user");

        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
        ))
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| email_conflict(e.into(), &record.email))?;

        Ok(record.into())
    }

    /// Gets a user by id, or `UserNotFound`.
    pub async fn get(&self, id: &str) -> DbResult<User> {
        self.get_record(id).await.map(User::from)
    }

    async fn get_record(&self, id: &str) -> DbResult<UserRecord> {
        sqlx::query_as::<_, UserRecord>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(id.to_string()).into())
    }

    /// Finds an account by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Checks an email/password pair. `None` for an unknown email or a wrong
    /// password alike.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> DbResult<Option<User>> {
        let Some(record) = self.find_by_email(email).await? else {
            return Ok(None);
        };

        if verify_password(password, &record.password_hash) {
            Ok(Some(record.into()))
        } else {
            Ok(None)
        }
    }

    /// Lists all accounts, oldest first.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(User::from).collect())
    }

    /// Updates name, email, role and/or password.
    ///
    /// No account can be promoted to superadmin, and the superadmin's own
    /// role cannot change.
    pub async fn update(&self, id: &str, patch: &UserPatch) -> DbResult<User> {
        validate_user_patch(patch)?;

        let current = self.get_record(id).await?;

        let role = match patch.role {
            Some(Role::Superadmin) if current.role != Role::Superadmin => {
                return Err(assignable_roles_error())
            }
            Some(role) if current.role == Role::Superadmin && role != Role::Superadmin => {
                return Err(ValidationError::Rule(
                    "the superadmin role cannot be changed".to_string(),
                )
                .into())
            }
            Some(role) => role,
            None => current.role,
        };

        let name = patch
            .name
            .as_deref()
            .map(|n| n.trim().to_string())
            .unwrap_or(current.name);
        let email = patch
            .email
            .as_deref()
            .map(normalize_email)
            .unwrap_or(current.email);
        let password_hash = match &patch.password {
            Some(password) => hash_password(password)?,
            None => current.password_hash,
        };

        debug!(id = %id, role = %role, "Updating user");

        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET name = ?, email = ?, password_hash = ?, role = ?
            WHERE id = ?
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&name)
        .bind(&email)
        .bind(&password_hash)
        .bind(role)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| email_conflict(e.into(), &email))?
        .ok_or_else(|| DbError::from(CoreError::UserNotFound(id.to_string())))?;

        Ok(record.into())
    }

    /// Deletes an account. The superadmin account cannot be deleted.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let current = self.get_record(id).await?;
        if current.role == Role::Superadmin {
            return Err(
                ValidationError::Rule("the superadmin account cannot be deleted".to_string())
                    .into(),
            );
        }

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::UserNotFound(id.to_string()).into());
        }

        debug!(id = %id, "Deleted user");
        Ok(())
    }

    fn build_record(&self, new: &NewUser) -> DbResult<UserRecord> {
        Ok(UserRecord {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            email: new.email.clone(),
            password_hash: hash_password(&new.password)?,
            role: new.role,
            created_at: Utc::now(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Hashes a password for storage (Argon2id, random salt, PHC string).
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC string.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn assignable_roles_error() -> DbError {
    ValidationError::NotAllowed {
        field: "role".to_string(),
        allowed: vec![Role::Admin.to_string(), Role::Pharmacist.to_string()],
    }
    .into()
}

fn email_conflict(err: DbError, email: &str) -> DbError {
    if err.is_unique_violation_on("email") {
        ValidationError::Duplicate {
            field: "email".to_string(),
            value: email.to_string(),
        }
        .into()
    } else {
        err
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
