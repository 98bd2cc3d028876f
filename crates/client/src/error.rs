use slyvid_core::error::CoreError;

/// Errors from the platform API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("API error in {method} ({status}): {body}")]
    Status {
        /// API method name, e.g. `projects.add`.
        method: String,
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A local file to upload could not be read.
    #[error("failed to read {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },

    /// The response was well-formed JSON but not what the method promises.
    #[error("unexpected response from {method}: {message}")]
    InvalidResponse { method: String, message: String },

    /// A document could not be converted to or from domain types.
    #[error("annotation model error: {0}")]
    Model(#[from] CoreError),
}
