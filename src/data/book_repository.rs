use crate::domain::book::Book;
use crate::domain::repository::BookRepository;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryBookRepository {
    storage: Arc<RwLock<HashMap<String, Book>>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryBookRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    #[instrument(skip(self, book), fields(book_id = %book.id, title = %book.title))]
    async fn insert_book(&self, book: Book) -> Result<()> {
        trace!("Acquiring write lock for book storage");
        let mut storage = self.storage.write().await;
        storage.insert(book.id.clone(), book);
        debug!("Book saved to memory storage");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_books(&self, author: Option<&str>) -> Result<Vec<Book>> {
        trace!("Acquiring read lock for book storage");
        let storage = self.storage.read().await;
        let books: Vec<Book> = storage
            .values()
            .filter(|b| author.is_none_or(|a| b.is_authored_by(a)))
            .cloned()
            .collect();
        debug!(count = books.len(), "Listed books");
        Ok(books)
    }

    #[instrument(skip(self), fields(book_id = id))]
    async fn find_book_by_id(&self, id: &str) -> Result<Option<Book>> {
        trace!("Acquiring read lock for book storage");
        let storage = self.storage.read().await;
        Ok(storage.get(id).cloned())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_books_by_ids(&self, ids: &[String]) -> Result<Vec<Book>> {
        let storage = self.storage.read().await;
        Ok(ids.iter().filter_map(|id| storage.get(id).cloned()).collect())
    }

    #[instrument(skip(self), fields(book_id = id, author = author))]
    async fn delete_book_by_author(&self, id: &str, author: &str) -> Result<Option<Book>> {
        trace!("Acquiring write lock for book storage");
        let mut storage = self.storage.write().await;
        let owned = storage.get(id).is_some_and(|b| b.is_authored_by(author));
        if !owned {
            trace!("No book with this id for this author");
            return Ok(None);
        }
        let removed = storage.remove(id);
        debug!("Book deleted from memory storage");
        Ok(removed)
    }
}
