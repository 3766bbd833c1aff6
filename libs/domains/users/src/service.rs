use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{LoginUser, RegisterUser, UpdateProfile, User, UserView};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Register a new user with password hashing
    pub async fn register(&self, input: RegisterUser) -> UserResult<UserView> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let password_hash = self.hash_password(&input.password)?;
        let user = User::new(input.name, input.email, password_hash);

        let created = self.repository.create(user).await?;
        Ok(created.into())
    }

    /// Verify credentials for login
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the
    /// caller.
    pub async fn verify_credentials(&self, input: &LoginUser) -> UserResult<UserView> {
        let user = self
            .repository
            .get_by_email(&input.email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !self.verify_password(&input.password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user.into())
    }

    /// Get a user's profile
    pub async fn get_profile(&self, id: Uuid) -> UserResult<UserView> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(user.into())
    }

    /// Update the authenticated user's profile
    pub async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> UserResult<UserView> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        // Hash new password if provided
        let new_password_hash = if let Some(ref password) = input.password {
            Some(self.hash_password(password)?)
        } else {
            None
        };

        // Check for duplicate email if email is being changed
        if let Some(ref new_email) = input.email {
            if !new_email.eq_ignore_ascii_case(&user.email)
                && self.repository.email_exists(new_email).await?
            {
                return Err(UserError::DuplicateEmail(new_email.clone()));
            }
        }

        user.apply_update(input, new_password_hash);

        let updated = self.repository.update(user).await?;
        Ok(updated.into())
    }

    /// List all users in their public shape
    pub async fn list_users(&self) -> UserResult<Vec<UserView>> {
        let users = self.repository.list().await?;
        Ok(users.into_iter().map(|user| user.into()).collect())
    }

    // Password helpers

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
