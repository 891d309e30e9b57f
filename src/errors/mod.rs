use std::{fmt, io};
use axum::{http::StatusCode, response::{IntoResponse, Response}};

/// Custom error types for the wiki application
#[derive(Debug)]
pub enum WikiError {
    Io(io::Error),
    NotFound,
    InvalidPath,
    FormError(String),
    TemplateError(String),
    RenderError(String),
    Pattern(regex::Error),
}

impl fmt::Display for WikiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikiError::Io(e) => write!(f, "I/O error: {}", e),
            WikiError::NotFound => write!(f, "Not found"),
            WikiError::InvalidPath => write!(f, "Invalid path"),
            WikiError::FormError(e) => write!(f, "Form error: {}", e),
            WikiError::TemplateError(e) => write!(f, "Template error: {}", e),
            WikiError::RenderError(e) => write!(f, "Render error: {}", e),
            WikiError::Pattern(e) => write!(f, "Pattern error: {}", e),
        }
    }
}

impl std::error::Error for WikiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WikiError::Io(e) => Some(e),
            WikiError::Pattern(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WikiError {
    fn from(err: io::Error) -> Self {
        WikiError::Io(err)
    }
}

impl From<regex::Error> for WikiError {
    fn from(err: regex::Error) -> Self {
        WikiError::Pattern(err)
    }
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        let status = match self {
            WikiError::NotFound => StatusCode::NOT_FOUND,
            WikiError::InvalidPath | WikiError::FormError(_) => StatusCode::BAD_REQUEST,
            WikiError::Io(_)
            | WikiError::TemplateError(_)
            | WikiError::RenderError(_)
            | WikiError::Pattern(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
