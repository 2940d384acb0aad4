use crate::domain::book::Book;
use crate::domain::error::DomainError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r".+@.+\..+"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Record ids of saved books, in the order they were saved.
    pub saved_books: Vec<String>,
}

/// A user with its saved books loaded from the book store.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: User,
    pub saved_books: Vec<Book>,
}

impl UserProfile {
    /// Counts the books that resolved, so it always matches `saved_books`.
    pub fn book_count(&self) -> usize {
        self.saved_books.len()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl CreateUser {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.username.trim().is_empty() {
            return Err(DomainError::Validation("Username is required".to_string()));
        }
        let email_ok = match &*EMAIL_PATTERN {
            Ok(pattern) => pattern.is_match(&self.email),
            Err(e) => return Err(DomainError::Internal(format!("Invalid email pattern: {}", e))),
        };
        if !email_ok {
            return Err(DomainError::Validation(
                "Must use a valid email address".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(DomainError::Validation("Password is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
