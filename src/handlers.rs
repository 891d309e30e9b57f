use axum::{
    body,
    extract::{Request, State},
    http::{header, Method},
    response::{Html, IntoResponse, Response},
};
use log::{debug, info, warn};
use percent_encoding::percent_decode;

use crate::errors::WikiError;
use crate::types::{AppState, LoadOutcome, Mode, Page};
use crate::utils::found;

const MAX_FORM_BYTES: usize = 10 << 20;

/// Fields submitted by the edit form
#[derive(Debug, Default)]
pub struct SaveForm {
    pub body: Vec<u8>,
}

impl SaveForm {
    /// Read the `body` field from a urlencoded request body, then the query string.
    /// Values are kept as raw bytes. A request without a form body yields an empty field.
    pub async fn read(request: Request) -> Result<Self, WikiError> {
        let (parts, req_body) = request.into_parts();
        let query = parts.uri.query().unwrap_or_default().as_bytes();

        let has_form_body = [Method::POST, Method::PUT, Method::PATCH].contains(&parts.method)
            && parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(';').next())
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"));

        if has_form_body {
            let bytes = body::to_bytes(req_body, MAX_FORM_BYTES)
                .await
                .map_err(|e| WikiError::FormError(e.to_string()))?;
            if let Some(value) = form_value(&bytes, b"body") {
                return Ok(Self { body: value });
            }
        } else {
            debug!("No urlencoded body on {} request, using query only", parts.method);
        }
        Ok(Self { body: form_value(query, b"body").unwrap_or_default() })
    }
}

/// First value for `key` in `application/x-www-form-urlencoded` input
fn form_value(input: &[u8], key: &[u8]) -> Option<Vec<u8>> {
    input
        .split(|&b| b == b'&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (k, v) = match pair.iter().position(|&b| b == b'=') {
                Some(i) => (&pair[..i], &pair[i + 1..]),
                None => (pair, &pair[pair.len()..]),
            };
            (decode_component(k) == key).then(|| decode_component(v))
        })
}

fn decode_component(raw: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = raw.iter().map(|&b| if b == b'+' { b' ' } else { b }).collect();
    percent_decode(&spaced).collect()
}

/// Handle root path requests
pub async fn handle_root(State(state): State<AppState>) -> Response {
    found(&format!("/view/{}", state.front_page))
}

/// Render a page, or send the user to create it if it is not stored yet
pub fn view_page(state: &AppState, title: &str) -> Result<Response, WikiError> {
    let page = match state.pages.load(title) {
        Ok(LoadOutcome::Found(page)) => page,
        Ok(LoadOutcome::NotFound) => {
            info!("Page '{}' does not exist, redirecting to edit", title);
            return Ok(found(&format!("/edit/{}", title)));
        }
        Err(e) => {
            warn!("Could not load page '{}', redirecting to edit: {}", title, e);
            return Ok(found(&format!("/edit/{}", title)));
        }
    };
    let html = state.renderer.render(Mode::View, &page)?;
    Ok(Html(html).into_response())
}

/// Show the edit form, blank when the page does not exist yet
pub fn edit_page(state: &AppState, title: &str) -> Result<Response, WikiError> {
    let page = match state.pages.load(title) {
        Ok(LoadOutcome::Found(page)) => page,
        Ok(LoadOutcome::NotFound) => Page::empty(title),
        Err(e) => {
            warn!("Could not load page '{}', editing blank page: {}", title, e);
            Page::empty(title)
        }
    };
    let html = state.renderer.render(Mode::Edit, &page)?;
    Ok(Html(html).into_response())
}

/// Overwrite the stored page with the submitted body and go back to viewing it
pub fn save_page(state: &AppState, title: &str, form: SaveForm) -> Result<Response, WikiError> {
    let page = Page::new(title, form.body);
    state.pages.save(&page)?;
    Ok(found(&format!("/view/{}", title)))
}
