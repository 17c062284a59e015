use hiretools_core::pagination::PaginationError;

/// Token exchange failures
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Token endpoint returned HTTP {status} {status_text}: {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Token endpoint unreachable: {0}")]
    Network(String),

    #[error("Malformed token response: {0}")]
    Malformed(String),
}

/// Resource call failures
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("HTTP {status} {status_text}: {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response JSON: {0}")]
    Decode(String),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("API request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] PaginationError),
}
