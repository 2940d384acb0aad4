#![allow(dead_code)]

use booklist_api::application::auth_service::AuthService;
use booklist_api::application::library_service::LibraryService;
use booklist_api::data::book_repository::InMemoryBookRepository;
use booklist_api::data::user_repository::InMemoryUserRepository;
use booklist_api::presentation::schema::{BooklistSchema, build_schema};
use std::sync::Arc;

pub const JWT_SECRET: &str = "test-secret-key-for-graphql-tests";

pub const ADD_USER: &str = r#"
    mutation AddUser($username: String!, $email: String!, $password: String!) {
        addUser(username: $username, email: $email, password: $password) {
            token
            user { _id username email bookCount savedBooks { _id } }
        }
    }
"#;

pub const LOGIN: &str = r#"
    mutation Login($email: String!, $password: String!) {
        login(email: $email, password: $password) {
            token
            user { _id username }
        }
    }
"#;

pub const ME: &str = r#"
    query Me {
        me { _id username email bookCount savedBooks { _id bookId title } }
    }
"#;

pub const SAVE_BOOK: &str = r#"
    mutation SaveBook($input: BookInput!) {
        saveBook(input: $input) {
            username
            bookCount
            savedBooks { _id bookId title description authors image link }
        }
    }
"#;

pub const REMOVE_BOOK: &str = r#"
    mutation RemoveBook($bookId: ID!) {
        removeBook(bookId: $bookId) { _id bookId title authors }
    }
"#;

pub const USER: &str = r#"
    query User($username: String!) {
        user(username: $username) {
            username
            bookCount
            savedBooks { _id bookId title description authors image link }
        }
    }
"#;

pub fn schema() -> BooklistSchema {
    let users = Arc::new(InMemoryUserRepository::new());
    let books = Arc::new(InMemoryBookRepository::new());
    let auth_service = Arc::new(AuthService::new(
        users.clone(),
        books.clone(),
        JWT_SECRET.to_string(),
        3600,
    ));
    let library_service = Arc::new(LibraryService::new(users, books));
    build_schema(auth_service, library_service)
}

pub fn book_input(book_id: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "bookId": book_id,
        "title": title,
        "description": format!("About {}", title),
        "authors": ["Ursula K. Le Guin"],
        "image": format!("https://books.example/{}.jpg", book_id),
        "link": format!("https://books.example/{}", book_id),
    })
}

/// First error code in a GraphQL response body.
pub fn error_code(body: &serde_json::Value) -> Option<&str> {
    body["errors"][0]["extensions"]["code"].as_str()
}

pub fn error_message(body: &serde_json::Value) -> Option<&str> {
    body["errors"][0]["message"].as_str()
}
