//! Wikilet - a tiny personal wiki server
//!
//! Pages are flat text files named by title. They are served through
//! `/view/<title>`, `/edit/<title>` and `/save/<title>`, and `[PageName]`
//! tokens in viewed pages become links to other pages.

pub mod components;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod router;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::Config;
pub use errors::WikiError;
pub use types::{AppState, LoadOutcome, Mode, Page};
pub use services::{LinkService, PageService};
pub use components::{Renderer, Template};
pub use router::{build_router, PathMatcher};
