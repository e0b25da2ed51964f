//! Client-side synchronization and editing-state controller for the book
//! catalog. Owns the authoritative in-memory copy of the catalog, mediates
//! every remote call, and reconciles loading/error state with user intent.

use std::{fmt, sync::Arc};

use shared::domain::{Book, BookFields, BookId};
use tokio::sync::{broadcast, Mutex};
use tracing::error;

pub mod error;
mod remote;

pub use error::ClientError;
pub use remote::{BookService, RemoteBookClient};

/// Form mirror of a book's editable fields. Numeric fields stay raw text so
/// partially typed input survives without blocking the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditDraft {
    pub title: String,
    pub author: String,
    pub published_year: String,
    pub price: String,
    pub is_available: bool,
}

impl EditDraft {
    fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            published_year: book.published_year.to_string(),
            price: book.price.to_string(),
            is_available: book.is_available,
        }
    }

    /// Numeric conversion happens here, at submit time, never while typing.
    fn to_fields(&self) -> Result<BookFields, ClientError> {
        let published_year = self.published_year.trim().parse::<i64>().map_err(|_| {
            ClientError::NonNumericField {
                field: "published_year",
                value: self.published_year.clone(),
            }
        })?;
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .map_err(|_| ClientError::NonNumericField {
                field: "price",
                value: self.price.clone(),
            })?;
        Ok(BookFields {
            title: self.title.clone(),
            author: self.author.clone(),
            published_year,
            is_available: self.is_available,
            price,
        })
    }
}

/// One form-field assignment from the presentation layer. Text fields carry
/// the raw input verbatim; availability carries the checkbox flag.
#[derive(Debug, Clone)]
pub enum DraftField {
    Title(String),
    Author(String),
    PublishedYear(String),
    Price(String),
    IsAvailable(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Adding,
    Updating,
    Deleting,
}

impl fmt::Display for WriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteAction::Adding => "adding",
            WriteAction::Updating => "updating",
            WriteAction::Deleting => "deleting",
        })
    }
}

#[derive(Debug, Clone)]
pub enum CatalogEvent {
    /// Controller state changed; re-read it via [`CatalogController::state`].
    StateChanged,
    /// A write or delete failed; render this to the user, naming the action.
    WriteFailed {
        action: WriteAction,
        error: ClientError,
    },
}

/// Everything the presentation layer renders from, as one read-only snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub books: Vec<Book>,
    pub draft: EditDraft,
    pub editing: Option<BookId>,
    pub loading: bool,
    pub last_error: Option<ClientError>,
}

impl CatalogState {
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }
}

/// Asks the user to confirm a removal before the remote call is made.
/// Frontends wire this to a real confirmation dialog.
pub trait RemovalPrompt: Send + Sync {
    fn confirm_removal(&self, id: BookId) -> bool;
}

/// Declines every removal. Safe default for headless embedding.
pub struct DenyRemoval;

impl RemovalPrompt for DenyRemoval {
    fn confirm_removal(&self, _id: BookId) -> bool {
        false
    }
}

pub struct CatalogController {
    service: Arc<dyn BookService>,
    prompt: Arc<dyn RemovalPrompt>,
    state: Mutex<CatalogState>,
    events: broadcast::Sender<CatalogEvent>,
}

impl CatalogController {
    pub fn new(service: Arc<dyn BookService>) -> Arc<Self> {
        Self::new_with_prompt(service, Arc::new(DenyRemoval))
    }

    pub fn new_with_prompt(
        service: Arc<dyn BookService>,
        prompt: Arc<dyn RemovalPrompt>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            service,
            prompt,
            state: Mutex::new(CatalogState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> CatalogState {
        self.state.lock().await.clone()
    }

    /// One-time startup fetch. Whoever constructs the controller calls this
    /// once; there is no implicit lifecycle hook.
    pub async fn initialize(&self) {
        self.refresh().await;
    }

    /// Fetches the full catalog and replaces the book list wholesale. On
    /// failure the previous list is left untouched.
    pub async fn refresh(&self) {
        self.enter_loading().await;
        let outcome = self.service.list().await;
        {
            let mut state = self.state.lock().await;
            match outcome {
                Ok(books) => state.books = books,
                Err(err) => {
                    error!(%err, "catalog refresh failed");
                    state.last_error = Some(err);
                }
            }
            state.loading = false;
        }
        self.notify_state_changed();
    }

    /// Synchronous draft mutation; stores raw input without conversion.
    pub async fn update_draft_field(&self, field: DraftField) {
        {
            let mut state = self.state.lock().await;
            match field {
                DraftField::Title(value) => state.draft.title = value,
                DraftField::Author(value) => state.draft.author = value,
                DraftField::PublishedYear(value) => state.draft.published_year = value,
                DraftField::Price(value) => state.draft.price = value,
                DraftField::IsAvailable(value) => state.draft.is_available = value,
            }
        }
        self.notify_state_changed();
    }

    /// Enters edit mode for `book`, overwriting any draft already in
    /// progress. Switching targets needs no confirmation.
    pub async fn begin_edit(&self, book: &Book) {
        {
            let mut state = self.state.lock().await;
            state.editing = Some(book.id);
            state.draft = EditDraft::from_book(book);
        }
        self.notify_state_changed();
    }

    /// Leaves edit mode and clears the draft. Never touches the server.
    pub async fn cancel_edit(&self) {
        {
            let mut state = self.state.lock().await;
            state.editing = None;
            state.draft = EditDraft::default();
        }
        self.notify_state_changed();
    }

    /// Sends the draft to the server: update when a book is being edited,
    /// create otherwise. Success resets the form and refreshes the list;
    /// failure keeps draft and target so the user can retry.
    pub async fn submit(&self) {
        let (draft, target) = {
            let state = self.state.lock().await;
            (state.draft.clone(), state.editing)
        };
        let action = if target.is_some() {
            WriteAction::Updating
        } else {
            WriteAction::Adding
        };

        self.enter_loading().await;
        let outcome = match draft.to_fields() {
            Ok(fields) => match target {
                Some(id) => self.service.update(id, fields).await.map(|_| ()),
                None => self.service.create(fields).await.map(|_| ()),
            },
            Err(err) => Err(err),
        };

        match outcome {
            Ok(()) => {
                {
                    let mut state = self.state.lock().await;
                    state.draft = EditDraft::default();
                    state.editing = None;
                    state.loading = false;
                }
                self.notify_state_changed();
                self.refresh().await;
            }
            Err(err) => {
                error!(%err, action = %action, "book submit failed");
                self.fail_operation(action, err).await;
            }
        }
    }

    /// Deletes a book after the injected prompt confirms it; declined
    /// removals are a complete no-op. Draft and editing target are left
    /// alone even when the removed book is the one being edited.
    pub async fn remove_book(&self, id: BookId) {
        if !self.prompt.confirm_removal(id) {
            return;
        }

        self.enter_loading().await;
        match self.service.delete(id).await {
            Ok(()) => {
                {
                    let mut state = self.state.lock().await;
                    state.loading = false;
                }
                self.notify_state_changed();
                self.refresh().await;
            }
            Err(err) => {
                error!(%err, book_id = id.0, "book removal failed");
                self.fail_operation(WriteAction::Deleting, err).await;
            }
        }
    }

    async fn enter_loading(&self) {
        {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.last_error = None;
        }
        self.notify_state_changed();
    }

    async fn fail_operation(&self, action: WriteAction, err: ClientError) {
        {
            let mut state = self.state.lock().await;
            state.last_error = Some(err.clone());
            state.loading = false;
        }
        let _ = self.events.send(CatalogEvent::WriteFailed { action, error: err });
        self.notify_state_changed();
    }

    fn notify_state_changed(&self) {
        let _ = self.events.send(CatalogEvent::StateChanged);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
