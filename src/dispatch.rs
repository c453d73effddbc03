//! Following links: classify, resolve, then act.
//!
//! [`Dispatcher`] owns the session state and the host collaborators. Every
//! failure is turned into a user notice; [`Dispatcher::follow`] itself never
//! fails.

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{LinkError, Result};
use crate::host::{CitationLookup, Editor, FileSystem, Notice, PathKind, Severity, UrlPredicate};
use crate::link::{classify, LinkKind, UrlPattern};
use crate::platform::Platform;
use crate::resolve::{resolve, ResolveContext, ResolvedPath};
use crate::session::SessionRoots;

pub type LinkTransform = Box<dyn Fn(&str) -> String>;

/// What a call to [`Dispatcher::follow`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowOutcome {
    OpenedBuffer(ResolvedPath),
    /// The target handed to the default application (already escaped).
    OpenedExternal(String),
    JumpedToHeading(String),
    /// The action was abandoned; carries the notice shown to the user.
    Abandoned(String),
}

pub struct Dispatcher<E, F> {
    editor: E,
    fs: F,
    settings: Settings,
    platform: Platform,
    session: SessionRoots,
    urls: Box<dyn UrlPredicate>,
    citations: Option<Box<dyn CitationLookup>>,
    link_transform: Option<LinkTransform>,
}

impl<E: Editor, F: FileSystem> Dispatcher<E, F> {
    pub fn new(settings: Settings, editor: E, fs: F) -> Dispatcher<E, F> {
        Dispatcher {
            editor,
            fs,
            settings,
            platform: Platform::current(),
            session: SessionRoots::new(),
            urls: Box::new(UrlPattern),
            citations: None,
            link_transform: None,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_session(mut self, session: SessionRoots) -> Self {
        self.session = session;
        self
    }

    pub fn with_url_predicate(mut self, urls: impl UrlPredicate + 'static) -> Self {
        self.urls = Box::new(urls);
        self
    }

    pub fn with_citations(mut self, citations: impl CitationLookup + 'static) -> Self {
        self.citations = Some(Box::new(citations));
        self
    }

    /// Rewrite raw link text before it is classified.
    pub fn with_link_transform(mut self, transform: impl Fn(&str) -> String + 'static) -> Self {
        self.link_transform = Some(Box::new(transform));
        self
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    pub fn session(&self) -> &SessionRoots {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Follow the link whose raw text is `raw`.
    pub fn follow(&mut self, raw: &str) -> FollowOutcome {
        let raw = match &self.link_transform {
            Some(transform) => transform(raw),
            None => raw.to_string(),
        };

        if let Some(document) = self.editor.current_document_path() {
            self.observe_document(&document);
        }

        match self.dispatch(&raw, None) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(link = %raw, error = %err, "abandoned link");
                let message = err.to_string();
                self.notify(Notice {
                    message: message.clone(),
                    severity: severity_of(&err),
                });
                FollowOutcome::Abandoned(message)
            }
        }
    }

    /// Resolve without side effects, against the current document.
    pub fn resolve(&self, raw: &str) -> Result<Option<ResolvedPath>> {
        let link = classify(raw, self.urls.as_ref());
        self.resolve_kind(link.kind, &link.target)
    }

    /// Record `document` as visited: the first one fixes the initial
    /// directory, and every one re-checks the notebook root.
    pub fn observe_document(&mut self, document: &Path) {
        self.session.observe(document);
        self.track_root(document);
    }

    fn track_root(&mut self, document: &Path) {
        let notice = self
            .session
            .update_root(document, &self.settings.perspective, &self.fs);
        if let Some(notice) = notice {
            self.notify(notice);
        }
    }

    fn dispatch(&mut self, raw: &str, via_citation: Option<&str>) -> Result<FollowOutcome> {
        let link = classify(raw, self.urls.as_ref());
        if link.target.trim().is_empty() {
            return Err(LinkError::EmptyTarget(link.kind));
        }

        match link.kind {
            LinkKind::PlainFilename => self.open_note(&link.target),
            LinkKind::ExternalFileRef => self.open_external(&link.target),
            LinkKind::Url => self.open_with_default_application(&link.target),
            LinkKind::Anchor => {
                self.editor.jump_to_heading(&link.target);
                Ok(FollowOutcome::JumpedToHeading(link.target))
            }
            LinkKind::Citation => {
                if let Some(key) = via_citation {
                    return Err(LinkError::NestedCitation {
                        key: key.to_string(),
                        target: raw.to_string(),
                    });
                }
                let target = self
                    .citations
                    .as_ref()
                    .and_then(|citations| citations.resolve_citation_key(&link.target))
                    .ok_or_else(|| LinkError::CitationNotFound(link.target.clone()))?;
                tracing::debug!(key = %link.target, %target, "citation resolved");
                self.dispatch(&target, Some(&link.target))
            }
        }
    }

    fn open_note(&mut self, target: &str) -> Result<FollowOutcome> {
        let resolved = self
            .resolve_kind(LinkKind::PlainFilename, target)?
            .ok_or_else(|| LinkError::MissingTarget(target.to_string()))?;
        let on_disk = PathBuf::from(self.platform.expand_home(&resolved.path));

        if self.settings.create_missing_directories {
            if let Some(parent) = on_disk.parent().filter(|p| !p.as_os_str().is_empty()) {
                if !self.fs.path_exists(parent, PathKind::Dir) {
                    tracing::info!(dir = %parent.display(), "creating missing directories");
                    self.fs
                        .make_directories(parent)
                        .map_err(|reason| LinkError::CreateDirectory {
                            path: parent.display().to_string(),
                            reason,
                        })?;
                }
            }
        }

        self.editor
            .open_buffer(&resolved.path)
            .map_err(|reason| LinkError::Open {
                path: resolved.path.clone(),
                reason,
            })?;
        if let Some(anchor) = &resolved.anchor {
            self.editor.jump_to_heading(anchor);
        }
        self.track_root(&on_disk);

        Ok(FollowOutcome::OpenedBuffer(resolved))
    }

    fn open_external(&mut self, target: &str) -> Result<FollowOutcome> {
        let resolved = self
            .resolve_kind(LinkKind::ExternalFileRef, target)?
            .ok_or_else(|| LinkError::MissingTarget(target.to_string()))?;
        let on_disk = PathBuf::from(self.platform.expand_home(&resolved.path));

        let exists = self.fs.path_exists(&on_disk, PathKind::File)
            || self.fs.path_exists(&on_disk, PathKind::Dir);
        if !exists {
            return Err(LinkError::MissingTarget(resolved.path));
        }

        self.open_with_default_application(&on_disk.to_string_lossy())
    }

    fn open_with_default_application(&mut self, target: &str) -> Result<FollowOutcome> {
        if self.platform.opener_command().is_none() {
            return Err(LinkError::UnsupportedPlatform(self.platform));
        }
        let escaped = self.platform.shell_escape(target).into_owned();
        self.fs
            .open_with_default_application(&escaped)
            .map_err(|reason| LinkError::Open {
                path: target.to_string(),
                reason,
            })?;
        Ok(FollowOutcome::OpenedExternal(escaped))
    }

    fn resolve_kind(&self, kind: LinkKind, target: &str) -> Result<Option<ResolvedPath>> {
        let document = self.editor.current_document_path();
        let implicit_extension = self.settings.implicit_extension();
        let ctx = self.context(document.as_deref(), &implicit_extension);
        resolve(kind, target, &ctx)
    }

    fn context<'a>(
        &'a self,
        document: Option<&'a Path>,
        implicit_extension: &'a str,
    ) -> ResolveContext<'a> {
        ResolveContext {
            perspective: &self.settings.perspective,
            roots: &self.session,
            current_document: document,
            implicit_extension,
            platform: self.platform,
        }
    }

    fn notify(&mut self, notice: Notice) {
        if self.settings.silent {
            return;
        }
        self.editor.notify(&notice.message, notice.severity);
    }
}

fn severity_of(err: &LinkError) -> Severity {
    match err {
        LinkError::CreateDirectory { .. } | LinkError::Open { .. } => Severity::Error,
        _ => Severity::Warning,
    }
}
