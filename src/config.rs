use std::fmt;
use std::path::Path;

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;

use crate::host::{FileSystem, PathKind};

pub const DEFAULT_IMPLICIT_EXTENSION: &str = "md";

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// Create missing parent directories before opening a new note. Off
    /// unless explicitly enabled.
    pub create_missing_directories: bool,
    pub perspective: Perspective,
    /// Extension appended to extensionless note links, without the dot
    pub implicit_extension: Option<String>,
    /// Suppress user notices (logging is unaffected)
    pub silent: bool,
}

/// What relative link paths are resolved against.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Perspective {
    pub priority: Priority,
    pub fallback: Fallback,
    pub root_tell: RootTell,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// The directory of the document being edited
    Current,
    /// The directory of the first document opened this session
    First,
    /// The discovered notebook root
    Root,
}

/// Used while `Priority::Root` is configured but no root has been found.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    Current,
    First,
}

/// How a notebook root is recognised: the directory contains an entry with
/// one of these names.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RootTell {
    Marker(String),
    AnyOf(Vec<String>),
}

impl RootTell {
    /// Whether `dir` holds one of the marker entries, as seen through `fs`.
    pub fn matches(&self, dir: &Path, fs: &dyn FileSystem) -> bool {
        let present = |marker: &String| {
            let entry = dir.join(marker);
            fs.path_exists(&entry, PathKind::File) || fs.path_exists(&entry, PathKind::Dir)
        };
        match self {
            RootTell::Marker(marker) => present(marker),
            RootTell::AnyOf(markers) => markers.iter().any(present),
        }
    }
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Current => f.write_str("current"),
            Fallback::First => f.write_str("first"),
        }
    }
}

impl Default for Perspective {
    fn default() -> Self {
        Perspective {
            priority: Priority::Current,
            fallback: Fallback::First,
            root_tell: RootTell::Marker(".git".to_string()),
        }
    }
}

impl Settings {
    pub fn new(root_dir: &Path) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/linkfollow/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.linkfollow",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("create_missing_directories", false)?
            .set_default("perspective.priority", "current")?
            .set_default("perspective.fallback", "first")?
            .set_default("perspective.root_tell", ".git")?
            .set_default("silent", false)?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }

    /// The implicit extension with its leading dot, e.g. `.md`.
    pub fn implicit_extension(&self) -> String {
        let ext = self
            .implicit_extension
            .as_deref()
            .map(|ext| ext.trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_IMPLICIT_EXTENSION);
        format!(".{ext}")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            create_missing_directories: false,
            perspective: Perspective::default(),
            implicit_extension: None,
            silent: false,
        }
    }
}
