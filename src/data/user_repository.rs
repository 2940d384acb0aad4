use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace, warn};

#[derive(Clone)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id, username = %user.username))]
    async fn insert_user(&self, user: User) -> Result<()> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;
        if storage.values().any(|u| u.username == user.username) {
            warn!(username = %user.username, "Username already taken");
            return Err(DomainError::Validation(format!(
                "Username '{}' is already taken",
                user.username
            ))
            .into());
        }
        if storage.values().any(|u| u.email == user.email) {
            warn!(email = %user.email, "Email already registered");
            return Err(DomainError::Validation(format!(
                "Email '{}' is already registered",
                user.email
            ))
            .into());
        }
        storage.insert(user.id.clone(), user.clone());
        debug!(user_id = %user.id, username = %user.username, "User saved to memory storage");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_all_users(&self) -> Result<Vec<User>> {
        trace!("Acquiring read lock for user storage");
        let storage = self.storage.read().await;
        let mut users: Vec<User> = storage.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    #[instrument(skip(self), fields(user_id = id))]
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        trace!("Acquiring read lock for user storage");
        let storage = self.storage.read().await;
        let user = storage.get(id).cloned();
        if user.is_none() {
            trace!(user_id = id, "User not found in storage");
        }
        Ok(user)
    }

    #[instrument(skip(self), fields(username = username))]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        trace!("Acquiring read lock for user storage");
        let storage = self.storage.read().await;
        let user = storage.values().find(|u| u.username == username).cloned();
        match &user {
            Some(u) => debug!(user_id = %u.id, username = %u.username, "User found in storage"),
            None => trace!(username = username, "User not found in storage"),
        }
        Ok(user)
    }

    #[instrument(skip(self), fields(email = email))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        trace!("Acquiring read lock for user storage");
        let storage = self.storage.read().await;
        let user = storage.values().find(|u| u.email == email).cloned();
        match &user {
            Some(u) => debug!(user_id = %u.id, email = %u.email, "User found in storage"),
            None => trace!(email = email, "User not found in storage"),
        }
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = user_id, book_id = book_id))]
    async fn add_saved_book(&self, user_id: &str, book_id: &str) -> Result<Option<User>> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;
        let Some(user) = storage.get_mut(user_id) else {
            trace!(user_id = user_id, "User not found in storage");
            return Ok(None);
        };
        if !user.saved_books.iter().any(|id| id == book_id) {
            user.saved_books.push(book_id.to_string());
            debug!(saved = user.saved_books.len(), "Book added to saved list");
        }
        Ok(Some(user.clone()))
    }

    #[instrument(skip(self), fields(user_id = user_id, book_id = book_id))]
    async fn remove_saved_book(&self, user_id: &str, book_id: &str) -> Result<Option<User>> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;
        let Some(user) = storage.get_mut(user_id) else {
            trace!(user_id = user_id, "User not found in storage");
            return Ok(None);
        };
        user.saved_books.retain(|id| id != book_id);
        debug!(saved = user.saved_books.len(), "Book pulled from saved list");
        Ok(Some(user.clone()))
    }
}
