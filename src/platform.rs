//! OS-family specific path handling.
//!
//! Every place that cares about separators, drive letters, home markers or
//! the "open with default application" command goes through [`Platform`], so
//! the classifier and resolver never branch on the OS themselves.

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static DRIVE_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]:[\\/]").expect("valid drive letter regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Unix,
    MacOs,
    Windows,
    Unsupported,
}

impl Platform {
    /// The OS family this binary was compiled for.
    pub fn current() -> Platform {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else if cfg!(unix) {
            Platform::Unix
        } else {
            Platform::Unsupported
        }
    }

    pub fn separator(self) -> char {
        match self {
            Platform::Windows => '\\',
            _ => '/',
        }
    }

    fn is_separator(self, c: char) -> bool {
        c == '/' || (self == Platform::Windows && c == '\\')
    }

    /// True for paths starting with a root marker, a home marker, or (on
    /// Windows) a drive letter.
    pub fn is_absolute(self, path: &str) -> bool {
        if path.starts_with('/') || path == "~" || path.starts_with("~/") {
            return true;
        }
        match self {
            Platform::Windows => path.starts_with('\\') || DRIVE_LETTER.is_match(path),
            _ => false,
        }
    }

    pub fn expand_home(self, path: &str) -> String {
        shellexpand::tilde(path).into_owned()
    }

    /// Joins `dir` and `rel` with exactly one separator between them.
    pub fn join(self, dir: &str, rel: &str) -> String {
        if dir.is_empty() {
            return rel.to_string();
        }
        match dir.chars().last() {
            Some(c) if self.is_separator(c) => format!("{dir}{rel}"),
            _ => format!("{dir}{}{rel}", self.separator()),
        }
    }

    /// Everything before the final separator, or `.` when there is none.
    pub fn parent_dir(self, path: &str) -> String {
        match path.rfind(|c: char| self.is_separator(c)) {
            Some(0) => path[..1].to_string(),
            Some(idx) => path[..idx].to_string(),
            None => ".".to_string(),
        }
    }

    /// Whether the final component of `path` carries a `.ext` suffix.
    ///
    /// A path ending in a separator names a directory and counts as having
    /// one, so no implicit extension is ever appended to it.
    pub fn has_extension(self, path: &str) -> bool {
        let file_name = match path.rfind(|c: char| self.is_separator(c)) {
            Some(idx) => &path[idx + 1..],
            None => path,
        };
        if file_name.is_empty() {
            return true;
        }
        match file_name.rfind('.') {
            Some(0) | None => false,
            Some(idx) => idx + 1 < file_name.len(),
        }
    }

    /// Shell command prefix that opens its argument with the default
    /// application, or `None` when the OS family has no known opener.
    pub fn opener_command(self) -> Option<&'static str> {
        match self {
            Platform::Unix => Some("xdg-open"),
            Platform::MacOs => Some("open"),
            Platform::Windows => Some("start \"\""),
            Platform::Unsupported => None,
        }
    }

    /// Quote `path` for interpolation into this platform's shell.
    pub fn shell_escape(self, path: &str) -> Cow<'_, str> {
        match self {
            Platform::Windows => Cow::Owned(format!("\"{}\"", path.replace('"', "\"\""))),
            _ => shell_words::quote(path),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Unix => "unix",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Unsupported => "this platform",
        };
        f.write_str(name)
    }
}
