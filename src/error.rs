//! Error taxonomy for the client core

use thiserror::Error;

/// Failure at the HTTP/JSON boundary
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status {
        status: u16,
        url: String,
        /// `detail` field of the error body, when the server sent one
        detail: Option<String>,
    },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed payload from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            FetchError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Empty or malformed user input; no request is issued
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Server-rejected signup payload or verification code
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Service unavailable: {0}")]
    Unavailable(FetchError),
}

impl VerificationError {
    /// Message suitable for showing next to the form
    pub fn user_message(&self) -> String {
        match self {
            VerificationError::Rejected { detail, .. } => detail.clone(),
            VerificationError::Unavailable(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<FetchError> for VerificationError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Status {
                status,
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => VerificationError::Rejected { status, detail },
            other => VerificationError::Unavailable(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum EnrollmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("Not allowed while at step {0}")]
    InvalidStep(&'static str),

    #[error("A request is already in flight")]
    AlreadySubmitting,

    #[error("Enrollment was reset before the response arrived")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum WatchlistError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The store was stopped, so the held list was not reloaded
    #[error("Watchlist is stopped; the list was not reloaded")]
    Stopped,
}
