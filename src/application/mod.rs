pub mod auth_service;
pub mod library_service;

use crate::domain::repository::BookRepository;
use crate::domain::user::{User, UserProfile};
use anyhow::Result;

/// Resolves a user's saved book ids into book records.
pub(crate) async fn load_profile<B: BookRepository + ?Sized>(
    books: &B,
    user: User,
) -> Result<UserProfile> {
    let saved_books = books.find_books_by_ids(&user.saved_books).await?;
    Ok(UserProfile { user, saved_books })
}
