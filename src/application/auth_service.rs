use crate::application::load_profile;
use crate::domain::auth::Auth;
use crate::domain::error::DomainError;
use crate::domain::repository::{BookRepository, UserRepository};
use crate::domain::user::{CreateUser, LoginRequest, User};
use crate::infrastructure::security::{generate_token, hash_password, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

pub struct AuthService<U: UserRepository, B: BookRepository> {
    user_repository: Arc<U>,
    book_repository: Arc<B>,
    jwt_secret: String,
    token_ttl_secs: u64,
}

impl<U: UserRepository, B: BookRepository> AuthService<U, B> {
    pub fn new(
        user_repository: Arc<U>,
        book_repository: Arc<B>,
        jwt_secret: String,
        token_ttl_secs: u64,
    ) -> Self {
        Self {
            user_repository,
            book_repository,
            jwt_secret,
            token_ttl_secs,
        }
    }

    #[instrument(skip(self, req), fields(username = %req.username, email = %req.email))]
    pub async fn add_user(&self, req: CreateUser) -> Result<Auth> {
        trace!("Starting user registration");
        req.validate()?;

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: req.username.trim().to_string(),
            email: req.email,
            password_hash,
            saved_books: Vec::new(),
        };

        // Uniqueness of username and email is enforced by the store.
        debug!(user_id = %user.id, "Saving user to repository");
        self.user_repository.insert_user(user.clone()).await?;

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, username = %user.username, "User registered successfully");

        Ok(Auth {
            token,
            user: load_profile(self.book_repository.as_ref(), user).await?,
        })
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<Auth> {
        trace!("Starting login");

        let user = self
            .user_repository
            .find_user_by_email(&req.email)
            .await?
            .ok_or_else(|| {
                warn!(email = %req.email, "User not found during login");
                DomainError::Authentication("No user found with this email address".to_string())
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;

        if !is_valid {
            warn!(user_id = %user.id, "Invalid password during login");
            return Err(DomainError::Authentication("Incorrect credentials".to_string()).into());
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, username = %user.username, "Login successful");

        Ok(Auth {
            token,
            user: load_profile(self.book_repository.as_ref(), user).await?,
        })
    }

    fn issue_token(&self, user: &User) -> Result<String> {
        generate_token(user, &self.jwt_secret, self.token_ttl_secs).map_err(|e| {
            error!(error = %e, "Failed to generate token");
            DomainError::Internal(format!("Failed to generate token: {}", e)).into()
        })
    }
}
