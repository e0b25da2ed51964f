use serde::{Deserialize, Serialize};

/// Server-assigned catalog record identifier. Immutable for the lifetime of
/// the record; serialized as a bare integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(pub i64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub published_year: i64,
    pub is_available: bool,
    pub price: f64,
}

/// Editable fields of a book, without the id. Request body for create and
/// update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub published_year: i64,
    pub is_available: bool,
    pub price: f64,
}

impl Book {
    pub fn fields(&self) -> BookFields {
        BookFields {
            title: self.title.clone(),
            author: self.author.clone(),
            published_year: self.published_year,
            is_available: self.is_available,
            price: self.price,
        }
    }
}
