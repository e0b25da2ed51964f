use thiserror::Error;

/// Classification of a failed catalog operation. Stored in controller state
/// for rendering and carried by failure notifications.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// The request never produced a usable response.
    #[error("server unreachable: {0}")]
    Transport(String),
    /// Any non-2xx response not covered by a more specific class.
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },
    /// The server rejected a create/update payload.
    #[error("server rejected payload ({status}): {body}")]
    Validation { status: u16, body: String },
    /// The targeted book no longer exists on the server.
    #[error("book not found on the server")]
    NotFound,
    /// A draft field could not be converted to a number at submit time.
    #[error("{field} is not a number: '{value}'")]
    NonNumericField { field: &'static str, value: String },
}
