/// Errors surfaced by the client transport and store.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered 404 for the requested entity.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The server returned another non-2xx status code.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Client configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// `true` if the server reported the entity as absent. Callers render
    /// this as a "not found" state instead of a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}
