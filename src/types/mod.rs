use std::sync::Arc;

use crate::components::Renderer;
use crate::errors::WikiError;
use crate::router::PathMatcher;
use crate::services::PageService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pages: Arc<PageService>,
    pub renderer: Arc<Renderer>,
    pub matcher: Arc<PathMatcher>,
    pub front_page: Arc<String>,
}

impl AppState {
    pub fn new(pages: PageService, renderer: Renderer, front_page: &str) -> Result<Self, WikiError> {
        Ok(Self {
            pages: Arc::new(pages),
            renderer: Arc::new(renderer),
            matcher: Arc::new(PathMatcher::new()?),
            front_page: Arc::new(front_page.to_string()),
        })
    }
}

/// A named wiki page. The title doubles as the on-disk identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(title: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self { title: title.into(), body: body.into() }
    }

    /// A page with no body, shown when editing a title for the first time
    pub fn empty(title: impl Into<String>) -> Self {
        Self { title: title.into(), body: Vec::new() }
    }
}

/// Result of looking a page up in storage
#[derive(Debug)]
pub enum LoadOutcome {
    Found(Page),
    NotFound,
}

/// Presentation mode a page is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Edit,
}
