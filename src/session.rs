//! Session state shared between link resolutions.
//!
//! [`SessionRoots`] records the directory of the first document seen this
//! session and the currently discovered notebook root. The root is only ever
//! written by [`SessionRoots::update_root`]; the resolver reads it.

use std::path::{Component, Path, PathBuf};

use crate::config::{Perspective, Priority, RootTell};
use crate::host::{FileSystem, Notice};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionRoots {
    initial_dir: Option<PathBuf>,
    root_dir: Option<PathBuf>,
    /// Set after a failed search so the fallback warning is only shown once
    /// until a root turns up again.
    root_missing: bool,
}

impl SessionRoots {
    pub fn new() -> SessionRoots {
        SessionRoots::default()
    }

    /// Start from known directories, e.g. when a host restores a session.
    pub fn with_dirs(initial_dir: Option<PathBuf>, root_dir: Option<PathBuf>) -> SessionRoots {
        SessionRoots {
            initial_dir,
            root_dir,
            root_missing: false,
        }
    }

    pub fn initial_dir(&self) -> Option<&Path> {
        self.initial_dir.as_deref()
    }

    pub fn root_dir(&self) -> Option<&Path> {
        self.root_dir.as_deref()
    }

    /// Record the directory of the first document ever observed. Later calls
    /// are no-ops.
    pub fn observe(&mut self, document: &Path) {
        if self.initial_dir.is_none() {
            self.initial_dir = Some(document_dir(document));
        }
    }

    /// Re-discover the notebook root if `document` has left the recorded one.
    ///
    /// Returns the notice to show the user, if any. Does nothing unless the
    /// perspective prioritises the root. Marker entries are looked up
    /// through `fs`.
    pub fn update_root(
        &mut self,
        document: &Path,
        perspective: &Perspective,
        fs: &dyn FileSystem,
    ) -> Option<Notice> {
        if perspective.priority != Priority::Root {
            return None;
        }

        let dir = document_dir(document);
        if let Some(root) = &self.root_dir {
            if dir.starts_with(root) {
                return None;
            }
        }

        match find_root(&dir, &perspective.root_tell, fs) {
            Some(root) => {
                tracing::info!(root = %root.display(), "notebook root found");
                let notice = Notice::info(format!("Notebook root found: {}", root.display()));
                self.root_dir = Some(root);
                self.root_missing = false;
                Some(notice)
            }
            None => {
                self.root_dir = None;
                if self.root_missing {
                    tracing::debug!(dir = %dir.display(), "still no notebook root");
                    return None;
                }
                self.root_missing = true;
                tracing::warn!(
                    dir = %dir.display(),
                    fallback = %perspective.fallback,
                    "no notebook root found"
                );
                Some(Notice::warning(format!(
                    "No notebook root found; falling back to the '{}' perspective until a root is found",
                    perspective.fallback
                )))
            }
        }
    }
}

/// Absolute, lexically normalised directory of `document`. Relative
/// documents are taken against the working directory so the upward walk
/// reaches past the first path component.
fn document_dir(document: &Path) -> PathBuf {
    let parent = match document.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match std::path::absolute(parent) {
        Ok(absolute) => normalize(&absolute),
        Err(err) => {
            tracing::debug!(dir = %parent.display(), error = %err, "could not absolutize directory");
            normalize(parent)
        }
    }
}

/// Drop `.` components and fold `..` into its parent without touching the
/// disk.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Walk upward from `start` (inclusive) to the first directory satisfying
/// `tell`.
pub fn find_root(start: &Path, tell: &RootTell, fs: &dyn FileSystem) -> Option<PathBuf> {
    find_root_by(start, |dir| tell.matches(dir, fs))
}

pub fn find_root_by(start: &Path, is_root: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| !dir.as_os_str().is_empty() && is_root(dir))
        .map(Path::to_path_buf)
}
