use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::{HashingError, IssuedToken, PasswordHasher, TokenError, TokenIssuer};
use crate::database::models::UserResponse;
use crate::database::{DatabaseError, UserRepository};
use crate::validator::{Credentials, FieldError, Validator};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Hashing(#[from] HashingError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for CredentialError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(_) => CredentialError::DuplicateEmail,
            other => CredentialError::Database(other),
        }
    }
}

/// Sign-up and login on top of the user store, the hasher and the token issuer
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<TokenIssuer>,
    validator: Arc<dyn Validator<Credentials>>,
}

impl CredentialService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<TokenIssuer>,
        validator: Arc<dyn Validator<Credentials>>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            validator,
        }
    }

    /// Register a new account. Uniqueness is left to the store's constraint.
    pub async fn sign_up(&self, credentials: Credentials) -> Result<UserResponse, CredentialError> {
        let errors = self.validator.validate(&credentials);
        if !errors.is_empty() {
            return Err(CredentialError::Validation(errors));
        }

        let hash = self.hasher.hash(&credentials.password).await?;
        let user = self.users.create_user(&credentials.email, &hash).await?;

        info!(user_id = user.id, "user signed up");
        Ok(UserResponse::from(user))
    }

    /// Check credentials and mint a session token.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`, and both pay
    /// for one full hash verification.
    pub async fn login(&self, credentials: Credentials) -> Result<IssuedToken, CredentialError> {
        let Some(user) = self.users.find_by_email(&credentials.email).await? else {
            self.hasher.verify_dummy(&credentials.password).await?;
            debug!("login rejected");
            return Err(CredentialError::InvalidCredentials);
        };

        if !self.hasher.verify(&credentials.password, &user.password_hash).await? {
            debug!("login rejected");
            return Err(CredentialError::InvalidCredentials);
        }

        let issued = self.tokens.issue(user.id)?;
        info!(user_id = user.id, "user logged in");
        Ok(issued)
    }

    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.tokens
    }
}
