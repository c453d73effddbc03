//! Link classification.
//!
//! [`classify`] maps the raw text of a link target onto a [`LinkKind`]. It
//! is a pure function of the string and the URL predicate: it never touches
//! the filesystem and never fails.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::host::UrlPredicate;

pub const FILE_PREFIX: &str = "file:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// A note in the notebook, e.g. `projects/plan` or `notes.md#Setup`.
    PlainFilename,
    /// `file:` prefixed; opened with the default application.
    ExternalFileRef,
    Url,
    /// `#heading` in the current document.
    Anchor,
    /// `@key`, looked up in a bibliography.
    Citation,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkKind::PlainFilename => "filename",
            LinkKind::ExternalFileRef => "file",
            LinkKind::Url => "url",
            LinkKind::Anchor => "anchor",
            LinkKind::Citation => "citation",
        };
        f.write_str(name)
    }
}

/// A classified link: its kind and the part of the raw text that matters for
/// that kind (prefixes stripped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub kind: LinkKind,
    pub target: String,
}

pub fn classify(raw: &str, urls: &dyn UrlPredicate) -> Link {
    let (kind, target) = if let Some(rest) = raw.strip_prefix(FILE_PREFIX) {
        (LinkKind::ExternalFileRef, rest)
    } else if urls.looks_like_url(raw) {
        (LinkKind::Url, raw)
    } else if let Some(key) = raw.strip_prefix('@') {
        (LinkKind::Citation, key)
    } else if let Some(heading) = raw.strip_prefix('#') {
        (LinkKind::Anchor, heading)
    } else {
        (LinkKind::PlainFilename, raw)
    };

    tracing::debug!(raw, %kind, "classified link");

    Link {
        kind,
        target: target.to_string(),
    }
}

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)^(?:
            [a-z][a-z0-9+.\-]*://\S+
            | www\.\S+\.\S+
            | mailto:\S+@\S+
            | (?:[a-z0-9\-]+\.)+(?:com|org|net|edu|gov|io|dev|app|info|co|uk|de|fr|eu|me)(?:[/:?\#]\S*)?
        )$",
    )
    .expect("valid url regex")
});

/// The default URL predicate: an explicit scheme, a `www.` host, a `mailto:`
/// address, or a bare domain with a common top-level domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlPattern;

impl UrlPredicate for UrlPattern {
    fn looks_like_url(&self, text: &str) -> bool {
        URL_REGEX.is_match(text)
    }
}
