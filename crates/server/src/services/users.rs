//! Accounts and password authentication.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::{info, instrument, warn};

use waterline_core::{UserId, Username};

use super::{AuditLog, ServiceError, non_empty, require_admin};
use crate::models::{
    AuditAction, CreateUserInput, LoginInput, NewAuditEntry, NewUser, RequestContext, User,
};
use crate::store::{AuditSink, Store};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// User management and login.
pub struct UserService<'a> {
    store: &'a dyn Store,
    audit: AuditLog<'a>,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, audit: &'a dyn AuditSink) -> Self {
        Self {
            store,
            audit: AuditLog::new(audit),
        }
    }

    /// Check a username and password.
    ///
    /// Unknown users, malformed usernames and wrong passwords all produce
    /// the same error.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidCredentials` if the login fails.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: &LoginInput) -> Result<User, ServiceError> {
        let Ok(username) = Username::parse(&input.username) else {
            return Err(ServiceError::InvalidCredentials);
        };

        let Some(credentials) = self.store.find_credentials(&username).await? else {
            warn!("Login for unknown user");
            return Err(ServiceError::InvalidCredentials);
        };

        if verify_password(&input.password, &credentials.password_hash).is_err() {
            warn!(user_id = %credentials.user.id, "Login with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let user = credentials.user;
        info!(user_id = %user.id, role = %user.role, "User logged in");
        self.audit
            .record(NewAuditEntry::new(user.id, AuditAction::Login, "user").with_id(user.id))
            .await;
        Ok(user)
    }

    /// Create an account. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a malformed username, blank
    /// full name or short password, and `ServiceError::Conflict` if the
    /// username is taken.
    #[instrument(skip(self, input), fields(user_id = %ctx.user_id, username = %input.username))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateUserInput,
    ) -> Result<User, ServiceError> {
        require_admin(ctx)?;
        let username =
            Username::parse(&input.username).map_err(|e| ServiceError::validation(e.to_string()))?;
        let full_name = non_empty(&input.full_name, "full name")?;
        validate_password(&input.password)?;

        let user = self
            .store
            .insert_user(&NewUser {
                username,
                full_name,
                password_hash: hash_password(&input.password)?,
                role: input.role,
            })
            .await?;

        info!(new_user_id = %user.id, role = %user.role, "User created");
        self.audit
            .record(
                NewAuditEntry::new(ctx.user_id, AuditAction::Create, "user")
                    .with_id(user.id)
                    .with_detail(user.username.as_str()),
            )
            .await;
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn get(&self, ctx: &RequestContext, id: UserId) -> Result<User, ServiceError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(ServiceError::NotFound("user"))
    }

    /// All accounts, by username. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admins.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<User>, ServiceError> {
        require_admin(ctx)?;
        Ok(self.store.list_users().await?)
    }

    /// Delete an account. Admin only; admins cannot delete themselves.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` when deleting oneself and
    /// `ServiceError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn delete(&self, ctx: &RequestContext, id: UserId) -> Result<(), ServiceError> {
        require_admin(ctx)?;
        if id == ctx.user_id {
            return Err(ServiceError::validation("you cannot delete your own account"));
        }
        if !self.store.delete_user(id).await? {
            return Err(ServiceError::NotFound("user"));
        }

        info!(deleted_user_id = %id, "User deleted");
        self.audit
            .record(NewAuditEntry::new(ctx.user_id, AuditAction::Delete, "user").with_id(id))
            .await;
        Ok(())
    }
}

/// Reject passwords shorter than [`MIN_PASSWORD_LENGTH`] characters.
///
/// # Errors
///
/// Returns `ServiceError::Validation` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `ServiceError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ServiceError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), ServiceError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| ServiceError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ServiceError::InvalidCredentials)
}
