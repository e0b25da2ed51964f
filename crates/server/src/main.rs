use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use server_api::{create_book, delete_book, get_book, list_books, update_book, ApiContext};
use shared::{
    domain::{Book, BookFields, BookId},
    error::{ApiError, ErrorCode},
};
use storage::Storage;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let api = ApiContext { storage };

    let mut app = build_router(Arc::new(AppState { api }));
    if let Some(origin) = settings.cors_allow_origin.as_deref() {
        let origin: HeaderValue = origin.parse()?;
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers(Any),
        );
    }

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "book catalog server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/books", get(http_list_books).post(http_create_book))
        .route(
            "/books/:book_id",
            get(http_get_book)
                .put(http_update_book)
                .delete(http_delete_book),
        )
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Book>>, (StatusCode, Json<ApiError>)> {
    let books = list_books(&state.api).await.map_err(error_response)?;
    Ok(Json(books))
}

async fn http_get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<i64>,
) -> Result<Json<Book>, (StatusCode, Json<ApiError>)> {
    let book = get_book(&state.api, BookId(book_id))
        .await
        .map_err(error_response)?;
    Ok(Json(book))
}

async fn http_create_book(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<BookFields>,
) -> Result<(StatusCode, Json<Book>), (StatusCode, Json<ApiError>)> {
    let book = create_book(&state.api, fields)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn http_update_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<i64>,
    Json(fields): Json<BookFields>,
) -> Result<Json<Book>, (StatusCode, Json<ApiError>)> {
    let book = update_book(&state.api, BookId(book_id), fields)
        .await
        .map_err(error_response)?;
    Ok(Json(book))
}

async fn http_delete_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    delete_book(&state.api, BookId(book_id))
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

fn error_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}
