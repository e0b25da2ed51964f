use std::{fs, path::Path, str::FromStr};

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};

use shared::domain::{Book, BookFields, BookId};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn insert_book(&self, fields: &BookFields) -> Result<BookId> {
        let rec = sqlx::query(
            "INSERT INTO books (title, author, published_year, is_available, price)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&fields.title)
        .bind(&fields.author)
        .bind(fields.published_year)
        .bind(fields.is_available)
        .bind(fields.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(BookId(rec.get::<i64, _>(0)))
    }

    pub async fn book_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            "SELECT id, title, author, published_year, is_available, price
             FROM books WHERE id = ?",
        )
        .bind(book_id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(book_from_row))
    }

    pub async fn list_books(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            "SELECT id, title, author, published_year, is_available, price
             FROM books ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(book_from_row).collect())
    }

    /// Returns false when no row with that id exists.
    pub async fn update_book(&self, book_id: BookId, fields: &BookFields) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE books
             SET title = ?, author = ?, published_year = ?, is_available = ?, price = ?
             WHERE id = ?",
        )
        .bind(&fields.title)
        .bind(&fields.author)
        .bind(fields.published_year)
        .bind(fields.is_available)
        .bind(fields.price)
        .bind(book_id.0)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns false when no row with that id exists.
    pub async fn delete_book(&self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(book_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn book_from_row(row: SqliteRow) -> Book {
    Book {
        id: BookId(row.get::<i64, _>(0)),
        title: row.get::<String, _>(1),
        author: row.get::<String, _>(2),
        published_year: row.get::<i64, _>(3),
        is_available: row.get::<bool, _>(4),
        price: row.get::<f64, _>(5),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return Ok(());
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();
    if path.is_empty() {
        return Ok(());
    }

    let Some(parent) = Path::new(path).parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
