use shared::{
    domain::{Book, BookFields, BookId},
    error::{ApiError, ErrorCode},
};
use storage::Storage;
use tracing::warn;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

const TEXT_FIELD_MIN_CHARS: usize = 3;
const TEXT_FIELD_MAX_CHARS: usize = 1000;
const PUBLISHED_YEAR_MIN: i64 = 1801;
const PUBLISHED_YEAR_MAX: i64 = 2025;

pub async fn list_books(ctx: &ApiContext) -> Result<Vec<Book>, ApiError> {
    ctx.storage.list_books().await.map_err(internal)
}

pub async fn get_book(ctx: &ApiContext, book_id: BookId) -> Result<Book, ApiError> {
    ctx.storage
        .book_by_id(book_id)
        .await
        .map_err(internal)?
        .ok_or_else(book_not_found)
}

pub async fn create_book(ctx: &ApiContext, fields: BookFields) -> Result<Book, ApiError> {
    validate_fields(&fields)?;
    let book_id = ctx.storage.insert_book(&fields).await.map_err(internal)?;
    ctx.storage
        .book_by_id(book_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            warn!(book_id = book_id.0, "inserted book vanished before readback");
            ApiError::new(ErrorCode::Internal, "created book could not be read back")
        })
}

pub async fn update_book(
    ctx: &ApiContext,
    book_id: BookId,
    fields: BookFields,
) -> Result<Book, ApiError> {
    validate_fields(&fields)?;
    let updated = ctx
        .storage
        .update_book(book_id, &fields)
        .await
        .map_err(internal)?;
    if !updated {
        return Err(book_not_found());
    }
    ctx.storage
        .book_by_id(book_id)
        .await
        .map_err(internal)?
        .ok_or_else(book_not_found)
}

pub async fn delete_book(ctx: &ApiContext, book_id: BookId) -> Result<(), ApiError> {
    let deleted = ctx
        .storage
        .delete_book(book_id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(book_not_found());
    }
    Ok(())
}

fn validate_fields(fields: &BookFields) -> Result<(), ApiError> {
    validate_text("title", &fields.title)?;
    validate_text("author", &fields.author)?;
    if !(PUBLISHED_YEAR_MIN..=PUBLISHED_YEAR_MAX).contains(&fields.published_year) {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!(
                "published_year must be between {PUBLISHED_YEAR_MIN} and {PUBLISHED_YEAR_MAX}"
            ),
        ));
    }
    if !fields.price.is_finite() || fields.price < 0.0 {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "price must be a non-negative number",
        ));
    }
    Ok(())
}

fn validate_text(field: &str, value: &str) -> Result<(), ApiError> {
    let chars = value.trim().chars().count();
    if !(TEXT_FIELD_MIN_CHARS..=TEXT_FIELD_MAX_CHARS).contains(&chars) {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!(
                "{field} must be between {TEXT_FIELD_MIN_CHARS} and {TEXT_FIELD_MAX_CHARS} characters"
            ),
        ));
    }
    Ok(())
}

fn book_not_found() -> ApiError {
    ApiError::new(ErrorCode::NotFound, "book not found")
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext { storage }
    }

    fn fields() -> BookFields {
        BookFields {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            published_year: 1965,
            is_available: true,
            price: 9.99,
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_lists() {
        let ctx = setup().await;
        let created = create_book(&ctx, fields()).await.expect("create");
        assert!(created.id.0 > 0);

        let books = list_books(&ctx).await.expect("list");
        assert_eq!(books, vec![created]);
    }

    #[tokio::test]
    async fn update_replaces_fields_in_place() {
        let ctx = setup().await;
        let created = create_book(&ctx, fields()).await.expect("create");

        let mut changed = fields();
        changed.price = 4.5;
        changed.is_available = false;
        let updated = update_book(&ctx, created.id, changed)
            .await
            .expect("update");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.price, 4.5);
        assert!(!updated.is_available);
    }

    #[tokio::test]
    async fn rejects_short_title() {
        let ctx = setup().await;
        let mut bad = fields();
        bad.title = "Du".to_string();
        let err = create_book(&ctx, bad).await.expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn rejects_out_of_range_year() {
        let ctx = setup().await;
        let mut bad = fields();
        bad.published_year = 1700;
        let err = create_book(&ctx, bad).await.expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn rejects_negative_price() {
        let ctx = setup().await;
        let mut bad = fields();
        bad.price = -0.5;
        let err = create_book(&ctx, bad).await.expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn missing_book_yields_not_found() {
        let ctx = setup().await;
        let err = get_book(&ctx, BookId(42)).await.expect_err("get");
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = update_book(&ctx, BookId(42), fields())
            .await
            .expect_err("update");
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = delete_book(&ctx, BookId(42)).await.expect_err("delete");
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
