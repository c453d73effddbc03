//! Error types for link following.
//!
//! None of these escape [`Dispatcher::follow`](crate::dispatch::Dispatcher::follow):
//! the dispatcher turns each one into a user notice and abandons the current
//! action.

use thiserror::Error;

use crate::link::LinkKind;
use crate::platform::Platform;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Empty {0} link; nothing to follow")]
    EmptyTarget(LinkKind),

    #[error("{0} doesn't seem to exist!")]
    MissingTarget(String),

    #[error("Function unavailable for {0}! Please file an issue.")]
    UnsupportedPlatform(Platform),

    #[error("Couldn't create directory {path}: {reason:#}")]
    CreateDirectory { path: String, reason: anyhow::Error },

    #[error("Couldn't open {path}: {reason:#}")]
    Open { path: String, reason: anyhow::Error },

    #[error("No entry found for citation key @{0}")]
    CitationNotFound(String),

    #[error("Citation @{key} points at another citation ({target}); not following")]
    NestedCitation { key: String, target: String },

    #[error("No document is open to resolve {0} against")]
    NoCurrentDocument(String),
}

pub type Result<T> = std::result::Result<T, LinkError>;
