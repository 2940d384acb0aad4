use crate::domain::book::Book;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with a validation error when the username or email is taken.
    async fn insert_user(&self, user: User) -> Result<()>;
    async fn find_all_users(&self) -> Result<Vec<User>>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Appends `book_id` unless already present; returns the updated user.
    async fn add_saved_book(&self, user_id: &str, book_id: &str) -> Result<Option<User>>;
    async fn remove_saved_book(&self, user_id: &str, book_id: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn insert_book(&self, book: Book) -> Result<()>;
    async fn find_books(&self, author: Option<&str>) -> Result<Vec<Book>>;
    async fn find_book_by_id(&self, id: &str) -> Result<Option<Book>>;
    /// Returns the books with the given ids in the same order, skipping unknown ids.
    async fn find_books_by_ids(&self, ids: &[String]) -> Result<Vec<Book>>;
    /// Deletes the book only if `author` is among its authors.
    async fn delete_book_by_author(&self, id: &str, author: &str) -> Result<Option<Book>>;
}
