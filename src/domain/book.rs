use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    /// Identifier of the book in the external catalogue it was found in.
    pub book_id: String,
    pub title: String,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

impl Book {
    pub fn is_authored_by(&self, username: &str) -> bool {
        self.authors.iter().any(|a| a == username)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub book_id: String,
    pub title: String,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}
