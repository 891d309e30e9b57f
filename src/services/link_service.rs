use std::borrow::Cow;
use log::debug;
use regex::bytes::{Captures, Regex};
use crate::errors::WikiError;

/// Rewrites `[PageName]` tokens in rendered HTML into links to `/view/PageName`
pub struct LinkService {
    token: Regex,
}

impl LinkService {
    pub fn new() -> Result<Self, WikiError> {
        Ok(Self { token: Regex::new(r"\[([a-zA-Z0-9]+)\]")? })
    }

    /// Replace every non-overlapping link token. Input without tokens comes back untouched.
    pub fn rewrite<'a>(&self, html: &'a [u8]) -> Cow<'a, [u8]> {
        let out = self.token.replace_all(html, |caps: &Captures| {
            let name = &caps[1];
            let mut anchor = Vec::with_capacity(name.len() * 2 + 24);
            anchor.extend_from_slice(b"<a href=\"/view/");
            anchor.extend_from_slice(name);
            anchor.extend_from_slice(b"\">[");
            anchor.extend_from_slice(name);
            anchor.extend_from_slice(b"]</a>");
            anchor
        });
        if let Cow::Owned(ref bytes) = out {
            debug!("Rewrote link tokens, {} -> {} bytes", html.len(), bytes.len());
        }
        out
    }
}
