use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use log::{debug, info};
use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::errors::WikiError;
use crate::handlers::{edit_page, handle_root, save_page, view_page, SaveForm};
use crate::types::AppState;

/// The operations a request path can name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    View,
    Edit,
    Save,
}

impl Operation {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "view" => Some(Operation::View),
            "edit" => Some(Operation::Edit),
            "save" => Some(Operation::Save),
            _ => None,
        }
    }
}

/// Validates request paths of the form `/<operation>/<title>`
pub struct PathMatcher {
    valid_path: Regex,
}

impl PathMatcher {
    pub fn new() -> Result<Self, WikiError> {
        Ok(Self { valid_path: Regex::new(r"^/(edit|save|view)/([a-zA-Z0-9]+)$")? })
    }

    /// Split a valid path into its operation and title; anything else is `None`
    pub fn matches<'a>(&self, path: &'a str) -> Option<(Operation, &'a str)> {
        let caps = self.valid_path.captures(path)?;
        let op = Operation::from_segment(caps.get(1)?.as_str())?;
        Some((op, caps.get(2)?.as_str()))
    }
}

/// Build the application router: `/` redirects, everything else goes through `dispatch`
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(handle_root))
        .route("/*path", any(dispatch))
        .with_state(state)
}

/// Validate the decoded path and hand the title to the matching operation handler
pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let raw = request.uri().path();
    let Ok(path) = percent_decode_str(raw).decode_utf8().map(|p| p.into_owned()) else {
        info!("Undecodable path '{}'", raw);
        return WikiError::NotFound.into_response();
    };
    let Some((op, title)) = state.matcher.matches(&path) else {
        info!("No route for '{}'", path);
        return WikiError::NotFound.into_response();
    };
    debug!("Dispatching {:?} for '{}'", op, title);

    let result = match op {
        Operation::View => view_page(&state, title),
        Operation::Edit => edit_page(&state, title),
        Operation::Save => match SaveForm::read(request).await {
            Ok(form) => save_page(&state, title, form),
            Err(e) => {
                info!("Rejected save form for '{}': {}", title, e);
                Err(e)
            }
        },
    };
    result.into_response()
}
