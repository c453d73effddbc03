//! linkfollow: classify, resolve and follow links in Markdown notes
//!
//! This crate provides the link-following core of a note-taking editor
//! plugin: given the text of a link target, decide what kind of link it is,
//! resolve it to a path, and act on it.
//!
//! # Overview
//!
//! - **Classification**: `file:` references, URLs, `@citation` keys,
//!   `#anchors` and plain note names
//! - **Resolution**: relative paths against the current file, the first file
//!   opened this session, or a discovered notebook root
//! - **Dispatch**: open a buffer, hand a file or URL to the OS opener, or
//!   jump to a heading
//!
//! # Architecture
//!
//! - [`link`]: the classifier
//! - [`resolve`]: perspective-relative resolution
//! - [`session`]: first-file and notebook-root tracking
//! - [`dispatch`]: the [`Dispatcher`](dispatch::Dispatcher) tying it together
//! - [`host`]: traits the embedding editor implements
//! - [`platform`]: OS-family specific path handling
//! - [`config`]: settings
//!
//! # Usage
//!
//! ```ignore
//! use linkfollow::config::Settings;
//! use linkfollow::dispatch::Dispatcher;
//! use linkfollow::host::NativeFileSystem;
//!
//! let settings = Settings::new(&notebook_dir)?;
//! let mut dispatcher = Dispatcher::new(settings, my_editor, NativeFileSystem::default());
//! dispatcher.follow("projects/plan#Milestones");
//! ```

// Core pipeline
pub mod dispatch;
pub mod link;
pub mod resolve;
pub mod session;

// Collaborators and platform glue
pub mod host;
pub mod platform;

// Configuration and errors
pub mod config;
pub mod error;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
