use crate::application::auth_service::AuthService;
use crate::application::library_service::LibraryService;
use crate::data::book_repository::InMemoryBookRepository;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::auth::Principal;
use crate::domain::user::{CreateUser, LoginRequest};
use crate::presentation::error::to_graphql_error;
use crate::presentation::types::{AuthObject, BookInput, BookObject, UserObject};
use async_graphql::extensions::Tracing;
use async_graphql::{Context, EmptySubscription, ID, Object, Result, Schema};
use std::sync::Arc;

pub type SharedAuthService = Arc<AuthService<InMemoryUserRepository, InMemoryBookRepository>>;
pub type SharedLibraryService =
    Arc<LibraryService<InMemoryUserRepository, InMemoryBookRepository>>;
pub type BooklistSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Services are attached as schema data; a request may additionally carry a
/// [`Principal`] when its bearer token verified.
pub fn build_schema(auth: SharedAuthService, library: SharedLibraryService) -> BooklistSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .extension(Tracing)
        .data(auth)
        .data(library)
        .finish()
}

fn library_service<'a>(ctx: &Context<'a>) -> Result<&'a SharedLibraryService> {
    ctx.data::<SharedLibraryService>()
}

fn auth_service<'a>(ctx: &Context<'a>) -> Result<&'a SharedAuthService> {
    ctx.data::<SharedAuthService>()
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Every user with their saved books.
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<UserObject>> {
        let users = library_service(ctx)?.users().await.map_err(to_graphql_error)?;
        Ok(users.into_iter().map(UserObject::from).collect())
    }

    async fn user(&self, ctx: &Context<'_>, username: String) -> Result<Option<UserObject>> {
        let user = library_service(ctx)?
            .user(&username)
            .await
            .map_err(to_graphql_error)?;
        Ok(user.map(UserObject::from))
    }

    /// Books, optionally only those whose authors include `username`.
    async fn books(
        &self,
        ctx: &Context<'_>,
        username: Option<String>,
    ) -> Result<Vec<BookObject>> {
        let books = library_service(ctx)?
            .books(username.as_deref())
            .await
            .map_err(to_graphql_error)?;
        Ok(books.into_iter().map(BookObject::from).collect())
    }

    async fn book(&self, ctx: &Context<'_>, book_id: ID) -> Result<Option<BookObject>> {
        let book = library_service(ctx)?
            .book(&book_id)
            .await
            .map_err(to_graphql_error)?;
        Ok(book.map(BookObject::from))
    }

    /// The authenticated caller.
    async fn me(&self, ctx: &Context<'_>) -> Result<UserObject> {
        let principal = ctx.data_opt::<Principal>();
        let me = library_service(ctx)?.me(principal).await.map_err(to_graphql_error)?;
        Ok(me.into())
    }
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn add_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        email: String,
        password: String,
    ) -> Result<AuthObject> {
        let auth = auth_service(ctx)?
            .add_user(CreateUser {
                username,
                email,
                password,
            })
            .await
            .map_err(to_graphql_error)?;
        Ok(auth.into())
    }

    async fn login(&self, ctx: &Context<'_>, email: String, password: String) -> Result<AuthObject> {
        let auth = auth_service(ctx)?
            .login(LoginRequest { email, password })
            .await
            .map_err(to_graphql_error)?;
        Ok(auth.into())
    }

    /// Saves a book to the caller's list and returns the updated caller.
    async fn save_book(&self, ctx: &Context<'_>, input: BookInput) -> Result<UserObject> {
        let principal = ctx.data_opt::<Principal>();
        let user = library_service(ctx)?
            .save_book(principal, input.into())
            .await
            .map_err(to_graphql_error)?;
        Ok(user.into())
    }

    /// Deletes one of the caller's books and returns it.
    async fn remove_book(&self, ctx: &Context<'_>, book_id: ID) -> Result<BookObject> {
        let principal = ctx.data_opt::<Principal>();
        let book = library_service(ctx)?
            .remove_book(principal, &book_id)
            .await
            .map_err(to_graphql_error)?;
        Ok(book.into())
    }
}
