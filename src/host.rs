//! Collaborators supplied by the embedding application.
//!
//! The core never talks to an editor, a shell or a bibliography directly; it
//! goes through these traits. [`NativeFileSystem`] is the one implementation
//! shipped here, backed by `std::fs` metadata queries and the platform
//! opener.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context};

use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Notice {
        Notice {
            message: message.into(),
            severity: Severity::Info,
        }
    }

    pub fn warning(message: impl Into<String>) -> Notice {
        Notice {
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

pub trait Editor {
    /// Load (or create) a buffer for `path`.
    fn open_buffer(&mut self, path: &str) -> anyhow::Result<()>;

    fn current_document_path(&self) -> Option<PathBuf>;

    fn notify(&mut self, message: &str, severity: Severity);

    /// Move the cursor to the heading whose text matches `heading`.
    fn jump_to_heading(&mut self, heading: &str);
}

pub trait UrlPredicate {
    fn looks_like_url(&self, text: &str) -> bool;
}

impl<F> UrlPredicate for F
where
    F: Fn(&str) -> bool,
{
    fn looks_like_url(&self, text: &str) -> bool {
        self(text)
    }
}

pub trait CitationLookup {
    /// Map a citation key (without the `@`) to a link string to follow.
    fn resolve_citation_key(&self, key: &str) -> Option<String>;
}

impl CitationLookup for HashMap<String, String> {
    fn resolve_citation_key(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Dir,
}

pub trait FileSystem {
    fn path_exists(&self, path: &Path, kind: PathKind) -> bool;

    fn make_directories(&self, path: &Path) -> anyhow::Result<()>;

    /// Open `target` with the OS default application. `target` has already
    /// been shell-escaped for the platform.
    fn open_with_default_application(&self, target: &str) -> anyhow::Result<()>;
}

/// Filesystem access through metadata queries, opening through the platform
/// shell.
#[derive(Debug, Clone, Copy)]
pub struct NativeFileSystem {
    platform: Platform,
}

impl NativeFileSystem {
    pub fn new(platform: Platform) -> NativeFileSystem {
        NativeFileSystem { platform }
    }

    /// Run `line` through the platform shell. The line is already escaped
    /// for that shell and must reach it unchanged.
    fn shell_command(&self, line: &str) -> Command {
        match self.platform {
            Platform::Windows => cmd_command(line),
            _ => {
                let mut command = Command::new("sh");
                command.args(["-c", line]);
                command
            }
        }
    }
}

/// `cmd /C <line>`. `cmd` does its own parsing of the raw command line, so
/// the argument is appended without the C runtime quoting `arg` would add.
#[cfg(windows)]
fn cmd_command(line: &str) -> Command {
    use std::os::windows::process::CommandExt;

    let mut command = Command::new("cmd");
    command.arg("/C").raw_arg(line);
    command
}

#[cfg(not(windows))]
fn cmd_command(line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", line]);
    command
}

impl Default for NativeFileSystem {
    fn default() -> Self {
        NativeFileSystem::new(Platform::current())
    }
}

impl FileSystem for NativeFileSystem {
    fn path_exists(&self, path: &Path, kind: PathKind) -> bool {
        match std::fs::metadata(path) {
            Ok(meta) => match kind {
                PathKind::File => meta.is_file(),
                PathKind::Dir => meta.is_dir(),
            },
            Err(_) => false,
        }
    }

    fn make_directories(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(path).with_context(|| format!("create {}", path.display()))
    }

    fn open_with_default_application(&self, target: &str) -> anyhow::Result<()> {
        let opener = self
            .platform
            .opener_command()
            .ok_or_else(|| anyhow!("no opener for {}", self.platform))?;
        let line = format!("{opener} {target}");

        let mut command = self.shell_command(&line);
        command.stdout(Stdio::null()).stderr(Stdio::null());

        tracing::debug!(command = %line, "spawning opener");
        let status = command.status().with_context(|| "run opener command")?;
        if !status.success() {
            return Err(anyhow!("opener exited with {status}"));
        }
        Ok(())
    }
}
