//! GraphQL object and input types. Domain records are converted at the edge so
//! that storage-only fields (the password hash) never reach the schema.

use crate::domain::auth::Auth;
use crate::domain::book::{Book, NewBook};
use crate::domain::user::UserProfile;
use async_graphql::{ID, InputObject, SimpleObject};

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "Book")]
pub struct BookObject {
    /// Record id, used by `book` and `removeBook`.
    #[graphql(name = "_id")]
    pub id: ID,
    /// Identifier in the external catalogue.
    pub book_id: String,
    pub title: String,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

impl From<Book> for BookObject {
    fn from(book: Book) -> Self {
        Self {
            id: ID(book.id),
            book_id: book.book_id,
            title: book.title,
            description: book.description,
            authors: book.authors,
            image: book.image,
            link: book.link,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "User")]
pub struct UserObject {
    #[graphql(name = "_id")]
    pub id: ID,
    pub username: String,
    pub email: String,
    /// Number of books in `savedBooks`.
    pub book_count: i32,
    pub saved_books: Vec<BookObject>,
}

impl From<UserProfile> for UserObject {
    fn from(profile: UserProfile) -> Self {
        let book_count = i32::try_from(profile.book_count()).unwrap_or(i32::MAX);
        Self {
            id: ID(profile.user.id),
            username: profile.user.username,
            email: profile.user.email,
            book_count,
            saved_books: profile.saved_books.into_iter().map(BookObject::from).collect(),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "Auth")]
pub struct AuthObject {
    pub token: ID,
    pub user: UserObject,
}

impl From<Auth> for AuthObject {
    fn from(auth: Auth) -> Self {
        Self {
            token: ID(auth.token),
            user: auth.user.into(),
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct BookInput {
    pub book_id: String,
    pub title: String,
    pub description: Option<String>,
    #[graphql(default)]
    pub authors: Vec<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

impl From<BookInput> for NewBook {
    fn from(input: BookInput) -> Self {
        Self {
            book_id: input.book_id,
            title: input.title,
            description: input.description,
            authors: input.authors,
            image: input.image,
            link: input.link,
        }
    }
}
