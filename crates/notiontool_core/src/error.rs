use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure leaving this crate is classified into one of these
/// variants; raw transport or decode errors never cross the boundary.
#[derive(Error, Debug)]
pub enum Error {
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The API reports resources the integration cannot see exactly like
    /// nonexistent ones, so permission problems land here too.
    #[error("not found (or not shared with the integration): {0}")]
    NotFound(String),

    #[error("schema error for {identifier}: {message}")]
    Schema {
        identifier: String,
        message: String,
    },

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("transient API failure (HTTP {status}): {message}")]
    Transient { status: u16, message: String },

    #[error("API error [{code}]: {message}")]
    Api { code: String, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Auth(_) => 2,
            Error::NotFound(_) => 3,
            Error::Validation(_) => 4,
            Error::Schema { .. } => 5,
            Error::Transient { .. } | Error::Api { .. } | Error::Transport(_) => 1,
        }
    }
}

/// Map a structured gateway error onto the taxonomy. Classification keys
/// off the machine-readable `code` first and the HTTP status second; the
/// free-text message is carried along but never matched on.
pub fn classify_api_error(status: u16, code: &str, message: &str, identifier: &str) -> Error {
    match code {
        "unauthorized" | "restricted_resource" | "invalid_grant" => {
            Error::Auth(format!("[{code}] {message}"))
        }
        "object_not_found" => Error::NotFound(identifier.to_string()),
        "validation_error" | "invalid_json" | "invalid_request" | "invalid_request_url"
        | "missing_version" => Error::Validation(format!("[{code}] {message}")),
        "rate_limited" | "internal_server_error" | "service_unavailable"
        | "database_connection_unavailable" | "gateway_timeout" => Error::Transient {
            status,
            message: format!("[{code}] {message}"),
        },
        _ => match status {
            401 | 403 => Error::Auth(format!("[{code}] {message}")),
            404 => Error::NotFound(identifier.to_string()),
            429 => Error::Transient {
                status,
                message: format!("[{code}] {message}"),
            },
            _ if status >= 500 => Error::Transient {
                status,
                message: format!("[{code}] {message}"),
            },
            _ => Error::Api {
                code: code.to_string(),
                message: message.to_string(),
            },
        },
    }
}
