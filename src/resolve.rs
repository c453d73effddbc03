//! Perspective-relative path resolution.
//!
//! Only file-like links ([`LinkKind::PlainFilename`] and
//! [`LinkKind::ExternalFileRef`]) are resolved; everything else is handed to
//! another collaborator untouched.

use std::path::Path;

use crate::config::{Fallback, Perspective, Priority};
use crate::error::{LinkError, Result};
use crate::link::LinkKind;
use crate::platform::Platform;
use crate::session::SessionRoots;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Absolute, home-relative (`~/...`) or opener-ready path.
    pub path: String,
    /// Heading to jump to after opening.
    pub anchor: Option<String>,
}

/// Everything resolution reads besides the link itself.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub perspective: &'a Perspective,
    pub roots: &'a SessionRoots,
    pub current_document: Option<&'a Path>,
    /// With leading dot, e.g. `.md`.
    pub implicit_extension: &'a str,
    pub platform: Platform,
}

/// Resolve `path_part` of a link of the given kind.
///
/// Returns `Ok(None)` for kinds that are not resolved against the
/// filesystem. For [`LinkKind::PlainFilename`], a `#heading` suffix is split
/// off into [`ResolvedPath::anchor`].
pub fn resolve(
    kind: LinkKind,
    path_part: &str,
    ctx: &ResolveContext<'_>,
) -> Result<Option<ResolvedPath>> {
    let (path_part, anchor) = match kind {
        LinkKind::PlainFilename => split_anchor(path_part),
        LinkKind::ExternalFileRef => (path_part, None),
        LinkKind::Url | LinkKind::Anchor | LinkKind::Citation => return Ok(None),
    };

    let platform = ctx.platform;
    let mut path = if platform.is_absolute(path_part) {
        platform.expand_home(path_part)
    } else {
        let base = base_dir(ctx).ok_or_else(|| LinkError::NoCurrentDocument(path_part.to_string()))?;
        platform.join(&base, path_part)
    };

    if kind == LinkKind::PlainFilename && !platform.has_extension(&path) {
        path.push_str(ctx.implicit_extension);
    }

    tracing::debug!(%kind, link = path_part, resolved = %path, "resolved link");

    Ok(Some(ResolvedPath {
        path,
        anchor: anchor.map(str::to_string),
    }))
}

fn split_anchor(target: &str) -> (&str, Option<&str>) {
    match target.split_once('#') {
        Some((path, anchor)) if !path.is_empty() => {
            (path, Some(anchor).filter(|anchor| !anchor.is_empty()))
        }
        _ => (target, None),
    }
}

/// The directory relative links are joined onto, per the perspective.
fn base_dir(ctx: &ResolveContext<'_>) -> Option<String> {
    let perspective = ctx.perspective;
    let root = ctx.roots.root_dir();

    if perspective.priority == Priority::Root {
        if let Some(root) = root {
            return Some(path_string(root));
        }
    }

    let use_first = match perspective.priority {
        Priority::First => true,
        Priority::Root => perspective.fallback == Fallback::First,
        Priority::Current => false,
    };
    if use_first {
        if let Some(initial) = ctx.roots.initial_dir() {
            return Some(path_string(initial));
        }
    }

    let document = ctx.current_document?;
    Some(ctx.platform.parent_dir(&path_string(document)))
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
