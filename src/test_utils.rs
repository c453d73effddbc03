//! Shared test utilities for linkfollow.
//!
//! This module provides common helpers used across multiple test modules.
//! It is only compiled when running tests.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tempfile::TempDir;

use crate::host::{Editor, FileSystem, PathKind, Severity};

/// Creates a temporary notebook directory for testing.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: The temp directory handle (must be kept alive for the test duration)
/// - PathBuf: The path to the notebook subdirectory
///
/// The notebook lives one level below the temp dir so root discovery tests
/// have a parent directory without markers to walk into.
pub fn create_test_notebook_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let notebook_dir = temp_dir.path().join("notebook");
    fs::create_dir(&notebook_dir).expect("Failed to create notebook subdirectory");
    (temp_dir, notebook_dir)
}

/// An editor that records every request made of it.
#[derive(Debug, Default)]
pub struct RecordingEditor {
    pub current: Option<PathBuf>,
    pub opened: Vec<String>,
    pub headings: Vec<String>,
    pub notices: Vec<(String, Severity)>,
}

impl RecordingEditor {
    pub fn at(document: impl AsRef<Path>) -> RecordingEditor {
        RecordingEditor {
            current: Some(document.as_ref().to_path_buf()),
            ..Default::default()
        }
    }
}

impl Editor for RecordingEditor {
    fn open_buffer(&mut self, path: &str) -> anyhow::Result<()> {
        self.opened.push(path.to_string());
        Ok(())
    }

    fn current_document_path(&self) -> Option<PathBuf> {
        self.current.clone()
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        self.notices.push((message.to_string(), severity));
    }

    fn jump_to_heading(&mut self, heading: &str) {
        self.headings.push(heading.to_string());
    }
}

/// An in-memory filesystem: nothing exists until added.
#[derive(Debug, Default)]
pub struct RecordingFileSystem {
    pub files: RefCell<HashSet<PathBuf>>,
    pub dirs: RefCell<HashSet<PathBuf>>,
    pub created: RefCell<Vec<PathBuf>>,
    pub opened: RefCell<Vec<String>>,
    pub fail_mkdir: Cell<bool>,
}

impl RecordingFileSystem {
    pub fn add_file(&self, path: impl Into<PathBuf>) {
        self.files.borrow_mut().insert(path.into());
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.dirs.borrow_mut().insert(path.into());
    }
}

impl FileSystem for RecordingFileSystem {
    fn path_exists(&self, path: &Path, kind: PathKind) -> bool {
        match kind {
            PathKind::File => self.files.borrow().contains(path),
            PathKind::Dir => self.dirs.borrow().contains(path),
        }
    }

    fn make_directories(&self, path: &Path) -> anyhow::Result<()> {
        if self.fail_mkdir.get() {
            return Err(anyhow!("permission denied"));
        }
        self.created.borrow_mut().push(path.to_path_buf());
        self.dirs.borrow_mut().insert(path.to_path_buf());
        Ok(())
    }

    fn open_with_default_application(&self, target: &str) -> anyhow::Result<()> {
        self.opened.borrow_mut().push(target.to_string());
        Ok(())
    }
}
