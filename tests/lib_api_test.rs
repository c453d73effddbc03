//! Integration tests for the linkfollow library public API.
//!
//! These tests drive a [`Dispatcher`] the way an embedding editor would,
//! against a real temporary notebook on disk.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use linkfollow::config::{Fallback, Perspective, Priority, RootTell, Settings};
use linkfollow::dispatch::{Dispatcher, FollowOutcome};
use linkfollow::host::{Editor, FileSystem, NativeFileSystem, PathKind, Severity};
use linkfollow::link::{classify, LinkKind, UrlPattern};
use linkfollow::platform::Platform;
use linkfollow::resolve::ResolvedPath;

/// Helper: Create a temporary notebook directory for testing.
///
/// Returns (TempDir, PathBuf) - keep TempDir alive for test duration.
fn create_test_notebook_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let notebook_dir = temp_dir.path().join("notebook");
    fs::create_dir(&notebook_dir).expect("Failed to create notebook subdirectory");
    (temp_dir, notebook_dir)
}

#[derive(Default)]
struct FakeEditor {
    current: Option<PathBuf>,
    opened: Vec<String>,
    headings: Vec<String>,
    notices: Vec<(String, Severity)>,
}

impl Editor for FakeEditor {
    fn open_buffer(&mut self, path: &str) -> anyhow::Result<()> {
        self.opened.push(path.to_string());
        self.current = Some(PathBuf::from(path));
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

/// Real metadata queries and directory creation; opener calls are recorded
/// instead of spawned.
#[derive(Default)]
struct NoSpawnFileSystem {
    native: NativeFileSystem,
    opened: RefCell<Vec<String>>,
}

impl FileSystem for NoSpawnFileSystem {
    fn path_exists(&self, path: &Path, kind: PathKind) -> bool {
        self.native.path_exists(path, kind)
    }

    fn make_directories(&self, path: &Path) -> anyhow::Result<()> {
        self.native.make_directories(path)
    }

    fn open_with_default_application(&self, target: &str) -> anyhow::Result<()> {
        self.opened.borrow_mut().push(target.to_string());
        Ok(())
    }
}

fn dispatcher_at(
    settings: Settings,
    document: &Path,
) -> Dispatcher<FakeEditor, NoSpawnFileSystem> {
    let editor = FakeEditor {
        current: Some(document.to_path_buf()),
        ..Default::default()
    };
    Dispatcher::new(settings, editor, NoSpawnFileSystem::default()).with_platform(Platform::Unix)
}

fn root_settings(marker: &str) -> Settings {
    Settings {
        perspective: Perspective {
            priority: Priority::Root,
            fallback: Fallback::Current,
            root_tell: RootTell::Marker(marker.to_string()),
        },
        ..Default::default()
    }
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_classify_from_external_crate() {
    let cases = [
        ("file:paper.pdf", LinkKind::ExternalFileRef, "paper.pdf"),
        ("https://example.com", LinkKind::Url, "https://example.com"),
        ("@smith2020", LinkKind::Citation, "smith2020"),
        ("#Intro", LinkKind::Anchor, "Intro"),
        ("notes", LinkKind::PlainFilename, "notes"),
    ];
    for (raw, kind, target) in cases {
        let link = classify(raw, &UrlPattern);
        assert_eq!(link.kind, kind, "{raw}");
        assert_eq!(link.target, target, "{raw}");
    }
}

// ============================================================================
// Following links against a real notebook
// ============================================================================

#[test]
fn test_follow_creates_missing_directories_on_disk() {
    let (_temp_dir, notebook) = create_test_notebook_dir();
    let document = notebook.join("index.md");
    fs::write(&document, "# Index").unwrap();

    let settings = Settings {
        create_missing_directories: true,
        ..Default::default()
    };
    let mut dispatcher = dispatcher_at(settings, &document);
    let outcome = dispatcher.follow("journal/2024/today#Tasks");

    let expected = notebook.join("journal/2024/today.md");
    assert_eq!(
        outcome,
        FollowOutcome::OpenedBuffer(ResolvedPath {
            path: expected.to_string_lossy().into_owned(),
            anchor: Some("Tasks".to_string()),
        })
    );
    assert!(notebook.join("journal/2024").is_dir());
    assert_eq!(dispatcher.editor().headings, vec!["Tasks".to_string()]);
}

#[test]
fn test_follow_external_file_that_exists() {
    let (_temp_dir, notebook) = create_test_notebook_dir();
    let document = notebook.join("index.md");
    fs::write(&document, "# Index").unwrap();
    fs::write(notebook.join("paper.pdf"), "%PDF").unwrap();

    let mut dispatcher = dispatcher_at(Settings::default(), &document);
    let outcome = dispatcher.follow("file:paper.pdf");

    assert!(matches!(outcome, FollowOutcome::OpenedExternal(_)));
    assert_eq!(dispatcher.file_system().opened.borrow().len(), 1);
    assert!(dispatcher.editor().notices.is_empty());
}

#[test]
fn test_follow_external_file_that_is_missing() {
    let (_temp_dir, notebook) = create_test_notebook_dir();
    let document = notebook.join("index.md");

    let mut dispatcher = dispatcher_at(Settings::default(), &document);
    let outcome = dispatcher.follow("file:missing.pdf");

    assert!(matches!(outcome, FollowOutcome::Abandoned(_)));
    assert!(dispatcher.file_system().opened.borrow().is_empty());
    let notices = &dispatcher.editor().notices;
    assert_eq!(notices.len(), 1);
    assert!(notices[0].0.contains("missing.pdf"));
}

#[test]
fn test_root_perspective_across_navigation() {
    let (_temp_dir, notebook) = create_test_notebook_dir();
    fs::create_dir(notebook.join(".git")).unwrap();
    fs::create_dir_all(notebook.join("areas/health")).unwrap();
    let document = notebook.join("areas/health/sleep.md");
    fs::write(&document, "# Sleep").unwrap();

    let mut dispatcher = dispatcher_at(root_settings(".git"), &document);

    // Root-relative, not document-relative.
    dispatcher.follow("areas/work/plan");
    // The opened buffer is still inside the root: no second discovery.
    dispatcher.follow("inbox");

    assert_eq!(dispatcher.session().root_dir(), Some(notebook.as_path()));
    assert_eq!(
        dispatcher.editor().opened,
        vec![
            notebook.join("areas/work/plan.md").to_string_lossy().into_owned(),
            notebook.join("inbox.md").to_string_lossy().into_owned(),
        ]
    );
    let infos = dispatcher
        .editor()
        .notices
        .iter()
        .filter(|(_, severity)| *severity == Severity::Info)
        .count();
    assert_eq!(infos, 1);
}

#[test]
fn test_root_perspective_falls_back_with_one_warning() {
    let (_temp_dir, notebook) = create_test_notebook_dir();
    let document = notebook.join("loose.md");
    fs::write(&document, "# Loose").unwrap();

    let mut dispatcher = dispatcher_at(root_settings(".linkfollow-no-such-marker"), &document);
    dispatcher.follow("a");
    dispatcher.follow("b");

    assert!(dispatcher.session().root_dir().is_none());
    let warnings: Vec<_> = dispatcher
        .editor()
        .notices
        .iter()
        .filter(|(_, severity)| *severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].0.contains("'current'"));
    // Fallback "current": resolved next to the document.
    assert_eq!(
        dispatcher.editor().opened[0],
        notebook.join("a.md").to_string_lossy().into_owned()
    );
}

#[test]
fn test_missing_directories_left_alone_by_default() {
    let (_temp_dir, notebook) = create_test_notebook_dir();
    let document = notebook.join("index.md");
    fs::write(&document, "# Index").unwrap();

    let mut dispatcher = dispatcher_at(Settings::default(), &document);
    let outcome = dispatcher.follow("journal/2024/today");

    assert!(matches!(outcome, FollowOutcome::OpenedBuffer(_)));
    assert!(!notebook.join("journal").exists());
}

#[test]
fn test_settings_struct_accessible() {
    let settings = Settings::default();

    assert!(!settings.create_missing_directories);
    assert!(!settings.silent);
    assert_eq!(settings.perspective.priority, Priority::Current);
    assert_eq!(settings.implicit_extension(), ".md");
}
