use super::*;
use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct CatalogServerState {
    books: Arc<Mutex<Vec<Book>>>,
    next_id: Arc<Mutex<i64>>,
}

async fn spawn_server(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

fn catalog_router(state: CatalogServerState) -> Router {
    async fn list(State(state): State<CatalogServerState>) -> Json<Vec<Book>> {
        Json(state.books.lock().await.clone())
    }

    async fn create(
        State(state): State<CatalogServerState>,
        Json(fields): Json<BookFields>,
    ) -> (StatusCode, Json<Book>) {
        let id = {
            let mut next_id = state.next_id.lock().await;
            *next_id += 1;
            BookId(*next_id)
        };
        let book = Book {
            id,
            title: fields.title,
            author: fields.author,
            published_year: fields.published_year,
            is_available: fields.is_available,
            price: fields.price,
        };
        state.books.lock().await.push(book.clone());
        (StatusCode::CREATED, Json(book))
    }

    async fn update(
        State(state): State<CatalogServerState>,
        Path(book_id): Path<i64>,
        Json(fields): Json<BookFields>,
    ) -> Result<Json<Book>, StatusCode> {
        let mut books = state.books.lock().await;
        let book = books
            .iter_mut()
            .find(|b| b.id.0 == book_id)
            .ok_or(StatusCode::NOT_FOUND)?;
        book.title = fields.title;
        book.author = fields.author;
        book.published_year = fields.published_year;
        book.is_available = fields.is_available;
        book.price = fields.price;
        Ok(Json(book.clone()))
    }

    async fn delete(
        State(state): State<CatalogServerState>,
        Path(book_id): Path<i64>,
    ) -> StatusCode {
        let mut books = state.books.lock().await;
        let before = books.len();
        books.retain(|b| b.id.0 != book_id);
        if books.len() < before {
            StatusCode::NO_CONTENT
        } else {
            StatusCode::NOT_FOUND
        }
    }

    Router::new()
        .route("/books", get(list).post(create))
        .route("/books/:book_id", axum::routing::put(update).delete(delete))
        .with_state(state)
}

fn fields() -> BookFields {
    BookFields {
        title: "The Left Hand of Darkness".to_string(),
        author: "Ursula K. Le Guin".to_string(),
        published_year: 1969,
        is_available: true,
        price: 8.25,
    }
}

#[tokio::test]
async fn create_then_list_round_trips() {
    let addr = spawn_server(catalog_router(CatalogServerState::default())).await;
    let client = RemoteBookClient::new(format!("http://{addr}"));

    let created = client.create(fields()).await.expect("create");
    assert!(created.id.0 > 0);
    assert_eq!(created.title, "The Left Hand of Darkness");

    let books = client.list().await.expect("list");
    assert_eq!(books, vec![created]);
}

#[tokio::test]
async fn update_and_delete_round_trip() {
    let addr = spawn_server(catalog_router(CatalogServerState::default())).await;
    let client = RemoteBookClient::new(format!("http://{addr}/"));

    let created = client.create(fields()).await.expect("create");
    let mut changed = fields();
    changed.price = 3.5;
    let updated = client.update(created.id, changed).await.expect("update");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.price, 3.5);

    client.delete(created.id).await.expect("delete");
    assert!(client.list().await.expect("list").is_empty());
}

#[tokio::test]
async fn missing_target_classifies_as_not_found() {
    let addr = spawn_server(catalog_router(CatalogServerState::default())).await;
    let client = RemoteBookClient::new(format!("http://{addr}"));

    let err = client
        .update(BookId(99), fields())
        .await
        .expect_err("update should fail");
    assert_eq!(err, ClientError::NotFound);

    let err = client
        .delete(BookId(99))
        .await
        .expect_err("delete should fail");
    assert_eq!(err, ClientError::NotFound);
}

#[tokio::test]
async fn write_rejection_classifies_as_validation() {
    let app = Router::new().route(
        "/books",
        post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "title too short") }),
    );
    let addr = spawn_server(app).await;
    let client = RemoteBookClient::new(format!("http://{addr}"));

    let err = client
        .create(fields())
        .await
        .expect_err("create should fail");
    assert_eq!(
        err,
        ClientError::Validation {
            status: 422,
            body: "title too short".to_string(),
        }
    );
}

#[tokio::test]
async fn non_2xx_read_classifies_as_server_error() {
    let app = Router::new().route(
        "/books",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = spawn_server(app).await;
    let client = RemoteBookClient::new(format!("http://{addr}"));

    let err = client.list().await.expect_err("list should fail");
    assert_eq!(
        err,
        ClientError::Server {
            status: 500,
            body: "boom".to_string(),
        }
    );
}

#[tokio::test]
async fn unreachable_server_classifies_as_transport() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = RemoteBookClient::new(format!("http://{addr}"));
    let err = client.list().await.expect_err("list should fail");
    assert!(matches!(err, ClientError::Transport(_)));
}
