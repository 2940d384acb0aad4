use crate::application::load_profile;
use crate::domain::auth::Principal;
use crate::domain::book::{Book, NewBook};
use crate::domain::error::DomainError;
use crate::domain::repository::{BookRepository, UserRepository};
use crate::domain::user::UserProfile;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub struct LibraryService<U: UserRepository, B: BookRepository> {
    user_repository: Arc<U>,
    book_repository: Arc<B>,
    // Saved-list mutations touch both stores; they run one at a time so the
    // duplicate and ownership checks still hold when the write lands.
    saved_list_lock: Mutex<()>,
}

impl<U: UserRepository, B: BookRepository> LibraryService<U, B> {
    pub fn new(user_repository: Arc<U>, book_repository: Arc<B>) -> Self {
        Self {
            user_repository,
            book_repository,
            saved_list_lock: Mutex::new(()),
        }
    }

    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<Vec<UserProfile>> {
        let users = self.user_repository.find_all_users().await?;
        let mut profiles = Vec::with_capacity(users.len());
        for user in users {
            profiles.push(load_profile(self.book_repository.as_ref(), user).await?);
        }
        Ok(profiles)
    }

    #[instrument(skip(self))]
    pub async fn user(&self, username: &str) -> Result<Option<UserProfile>> {
        match self.user_repository.find_user_by_username(username).await? {
            Some(user) => Ok(Some(load_profile(self.book_repository.as_ref(), user).await?)),
            None => Ok(None),
        }
    }

    /// Lists books, restricted to those whose authors include `username` when given.
    #[instrument(skip(self))]
    pub async fn books(&self, username: Option<&str>) -> Result<Vec<Book>> {
        self.book_repository.find_books(username).await
    }

    #[instrument(skip(self))]
    pub async fn book(&self, id: &str) -> Result<Option<Book>> {
        self.book_repository.find_book_by_id(id).await
    }

    #[instrument(skip(self, principal))]
    pub async fn me(&self, principal: Option<&Principal>) -> Result<UserProfile> {
        let principal = require(principal, "You need to be logged in!")?;
        let user = self
            .user_repository
            .find_user_by_id(&principal.user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %principal.user_id, "Token refers to a missing user");
                DomainError::NotFound("User not found".to_string())
            })?;
        load_profile(self.book_repository.as_ref(), user).await
    }

    /// Creates the book and appends it to the caller's saved list. The caller's
    /// username is added to `authors` so that `remove_book` recognises the owner.
    #[instrument(skip(self, principal, book), fields(book_id = %book.book_id))]
    pub async fn save_book(
        &self,
        principal: Option<&Principal>,
        book: NewBook,
    ) -> Result<UserProfile> {
        let principal = require(principal, "Unable to save book")?;
        let _guard = self.saved_list_lock.lock().await;

        let current = self.me(Some(principal)).await?;
        if current.saved_books.iter().any(|b| b.book_id == book.book_id) {
            debug!(user_id = %principal.user_id, "Book already saved");
            return Ok(current);
        }

        let mut authors = book.authors;
        if !authors.iter().any(|a| a == &principal.username) {
            authors.push(principal.username.clone());
        }
        let record = Book {
            id: Uuid::new_v4().to_string(),
            book_id: book.book_id,
            title: book.title,
            description: book.description,
            authors,
            image: book.image,
            link: book.link,
        };

        self.book_repository.insert_book(record.clone()).await?;
        let user = self
            .user_repository
            .add_saved_book(&principal.user_id, &record.id)
            .await?
            .ok_or_else(|| DomainError::NotFound("User not found".to_string()))?;

        info!(user_id = %user.id, book_id = %record.id, "Book saved");
        load_profile(self.book_repository.as_ref(), user).await
    }

    /// Deletes a book owned by the caller and pulls it from their saved list.
    #[instrument(skip(self, principal))]
    pub async fn remove_book(&self, principal: Option<&Principal>, book_id: &str) -> Result<Book> {
        let principal = require(principal, "You can not remove this book")?;
        let _guard = self.saved_list_lock.lock().await;

        // Authors are client supplied, so the caller must also hold the book
        // in their own saved list.
        let caller = self
            .user_repository
            .find_user_by_id(&principal.user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("User not found".to_string()))?;
        if !caller.saved_books.iter().any(|id| id == book_id) {
            warn!(user_id = %principal.user_id, book_id, "Book is not in the caller's saved list");
            return Err(not_owned(book_id));
        }

        let book = self
            .book_repository
            .delete_book_by_author(book_id, &principal.username)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %principal.user_id, book_id, "No owned book to remove");
                not_owned(book_id)
            })?;

        // Not transactional: the book is already gone if this update fails.
        if self
            .user_repository
            .remove_saved_book(&principal.user_id, &book.id)
            .await?
            .is_none()
        {
            warn!(user_id = %principal.user_id, "Removed book owner has no user record");
        }

        info!(user_id = %principal.user_id, book_id = %book.id, "Book removed");
        Ok(book)
    }
}

fn not_owned(book_id: &str) -> anyhow::Error {
    DomainError::NotFound(format!("No book with id {} found for this user", book_id)).into()
}

fn require<'a>(principal: Option<&'a Principal>, message: &str) -> Result<&'a Principal> {
    principal.ok_or_else(|| {
        warn!("Unauthenticated access to a protected operation");
        DomainError::Authentication(message.to_string()).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::book_repository::InMemoryBookRepository;
    use crate::data::user_repository::InMemoryUserRepository;
    use crate::domain::user::User;

    struct Fixture {
        service: LibraryService<InMemoryUserRepository, InMemoryBookRepository>,
        books: Arc<InMemoryBookRepository>,
    }

    async fn fixture(usernames: &[&str]) -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let books = Arc::new(InMemoryBookRepository::new());
        for name in usernames {
            users
                .insert_user(User {
                    id: format!("id-{}", name),
                    username: name.to_string(),
                    email: format!("{}@x.com", name),
                    password_hash: "hash".to_string(),
                    saved_books: Vec::new(),
                })
                .await
                .unwrap();
        }
        Fixture {
            service: LibraryService::new(users, books.clone()),
            books,
        }
    }

    fn principal(name: &str) -> Principal {
        Principal {
            user_id: format!("id-{}", name),
            username: name.to_string(),
            email: format!("{}@x.com", name),
        }
    }

    fn new_book(book_id: &str) -> NewBook {
        NewBook {
            book_id: book_id.to_string(),
            title: "Dune".to_string(),
            description: Some("Spice".to_string()),
            authors: vec!["Frank Herbert".to_string()],
            image: Some("http://img/dune.jpg".to_string()),
            link: None,
        }
    }

    fn is_auth_error(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Authentication(_))
        )
    }

    #[tokio::test]
    async fn test_me_requires_principal() {
        let f = fixture(&["amy"]).await;

        let err = f.service.me(None).await.unwrap_err();
        assert!(is_auth_error(&err));
        assert_eq!(err.to_string(), "You need to be logged in!");
    }

    #[tokio::test]
    async fn test_me_returns_callers_own_record() {
        let f = fixture(&["amy", "bob"]).await;

        let profile = f.service.me(Some(&principal("bob"))).await.unwrap();
        assert_eq!(profile.user.username, "bob");
    }

    #[tokio::test]
    async fn test_save_book_requires_principal() {
        let f = fixture(&["amy"]).await;

        let err = f.service.save_book(None, new_book("ext-1")).await.unwrap_err();
        assert!(is_auth_error(&err));
        assert!(f.books.find_books(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_book_appends_and_tags_owner() {
        let f = fixture(&["amy"]).await;

        let profile = f
            .service
            .save_book(Some(&principal("amy")), new_book("ext-1"))
            .await
            .unwrap();

        assert_eq!(profile.book_count(), 1);
        let saved = &profile.saved_books[0];
        assert_eq!(saved.book_id, "ext-1");
        assert_eq!(saved.authors, vec!["Frank Herbert", "amy"]);
    }

    #[tokio::test]
    async fn test_save_book_twice_is_idempotent() {
        let f = fixture(&["amy"]).await;
        let amy = principal("amy");

        f.service.save_book(Some(&amy), new_book("ext-1")).await.unwrap();
        let profile = f.service.save_book(Some(&amy), new_book("ext-1")).await.unwrap();

        assert_eq!(profile.book_count(), 1);
        assert_eq!(f.books.find_books(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_saved_book_round_trips_through_user_lookup() {
        let f = fixture(&["amy"]).await;
        let saved = f
            .service
            .save_book(Some(&principal("amy")), new_book("ext-1"))
            .await
            .unwrap()
            .saved_books
            .remove(0);

        let fetched = f.service.user("amy").await.unwrap().unwrap();
        assert_eq!(fetched.saved_books, vec![saved]);
    }

    #[tokio::test]
    async fn test_books_filters_by_username() {
        let f = fixture(&["amy", "bob"]).await;
        f.service
            .save_book(Some(&principal("amy")), new_book("ext-1"))
            .await
            .unwrap();
        f.service
            .save_book(Some(&principal("bob")), new_book("ext-2"))
            .await
            .unwrap();

        assert_eq!(f.service.books(None).await.unwrap().len(), 2);
        let amy_books = f.service.books(Some("amy")).await.unwrap();
        assert_eq!(amy_books.len(), 1);
        assert_eq!(amy_books[0].book_id, "ext-1");
    }

    #[tokio::test]
    async fn test_remove_book_deletes_and_pulls_from_saved_list() {
        let f = fixture(&["amy"]).await;
        let amy = principal("amy");
        let profile = f.service.save_book(Some(&amy), new_book("ext-1")).await.unwrap();
        let id = profile.saved_books[0].id.clone();

        let removed = f.service.remove_book(Some(&amy), &id).await.unwrap();

        assert_eq!(removed.id, id);
        assert!(f.service.book(&id).await.unwrap().is_none());
        assert_eq!(f.service.me(Some(&amy)).await.unwrap().book_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_book_of_another_user_is_refused() {
        let f = fixture(&["amy", "mallory"]).await;
        let profile = f
            .service
            .save_book(Some(&principal("amy")), new_book("ext-1"))
            .await
            .unwrap();
        let id = profile.saved_books[0].id.clone();

        let err = f
            .service
            .remove_book(Some(&principal("mallory")), &id)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::NotFound(_))
        ));
        assert!(f.service.book(&id).await.unwrap().is_some());
        assert_eq!(
            f.service.me(Some(&principal("amy"))).await.unwrap().book_count(),
            1
        );
    }

    #[tokio::test]
    async fn test_remove_book_with_spoofed_author_is_refused() {
        let f = fixture(&["amy", "bob"]).await;
        let mut book = new_book("ext-1");
        book.authors = vec!["amy".to_string()];
        let profile = f.service.save_book(Some(&principal("bob")), book).await.unwrap();
        let id = profile.saved_books[0].id.clone();

        let err = f
            .service
            .remove_book(Some(&principal("amy")), &id)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::NotFound(_))
        ));
        assert!(f.service.book(&id).await.unwrap().is_some());
        let bob = f.service.me(Some(&principal("bob"))).await.unwrap();
        assert_eq!(bob.book_count(), 1);
        assert_eq!(bob.saved_books.len(), 1);
    }

    #[tokio::test]
    async fn test_book_count_ignores_dangling_ids() {
        let f = fixture(&["amy"]).await;
        let amy = principal("amy");
        let id = f
            .service
            .save_book(Some(&amy), new_book("ext-1"))
            .await
            .unwrap()
            .saved_books[0]
            .id
            .clone();
        f.books.delete_book_by_author(&id, "amy").await.unwrap();

        let profile = f.service.me(Some(&amy)).await.unwrap();
        assert_eq!(profile.book_count(), 0);
        assert!(profile.saved_books.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_saves_of_same_book_keep_one_copy() {
        let f = fixture(&["amy"]).await;
        let service = Arc::new(f.service);

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .save_book(Some(&principal("amy")), new_book("ext-1"))
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(f.books.find_books(None).await.unwrap().len(), 1);
        let profile = service.me(Some(&principal("amy"))).await.unwrap();
        assert_eq!(profile.book_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_book_requires_principal() {
        let f = fixture(&["amy"]).await;

        let err = f.service.remove_book(None, "any").await.unwrap_err();
        assert!(is_auth_error(&err));
        assert_eq!(err.to_string(), "You can not remove this book");
    }

    #[tokio::test]
    async fn test_users_lists_populated_profiles() {
        let f = fixture(&["amy", "bob"]).await;
        f.service
            .save_book(Some(&principal("bob")), new_book("ext-1"))
            .await
            .unwrap();

        let users = f.service.users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].user.username, "amy");
        assert_eq!(users[0].book_count(), 0);
        assert_eq!(users[1].book_count(), 1);
        assert_eq!(users[1].saved_books[0].book_id, "ext-1");
    }

    #[tokio::test]
    async fn test_user_unknown_username_is_none() {
        let f = fixture(&["amy"]).await;

        assert!(f.service.user("nobody").await.unwrap().is_none());
    }
}
