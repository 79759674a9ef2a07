//! Core data types: translation units, diagnostics and per-file reports.

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

/// Handle of a unit inside its owning [`crate::XliffDocument`].
///
/// It is the index of the unit's `<trans-unit>` start tag in the document's
/// event list and is only meaningful for the document that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitHandle(pub(crate) usize);

/// One `<trans-unit>` element of an XLIFF document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Value of the `id` attribute. Empty when the attribute is missing.
    pub id: String,
    /// Legacy `resname` attribute, if present.
    pub resname: Option<String>,
    source: String,
    target: String,
    handle: UnitHandle,
}

impl TranslationUnit {
    pub(crate) fn new(
        id: String,
        resname: Option<String>,
        source: String,
        target: String,
        handle: UnitHandle,
    ) -> Self {
        Self {
            id,
            resname,
            source,
            target,
            handle,
        }
    }

    /// Creates a unit that is not attached to any document.
    pub fn detached(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::new(
            id.into(),
            None,
            source.into(),
            target.into(),
            UnitHandle(usize::MAX),
        )
    }

    /// Builder-style setter for the `resname` attribute.
    pub fn with_resname(mut self, resname: impl Into<String>) -> Self {
        self.resname = Some(resname.into());
        self
    }

    /// The untranslated reference text (`<source>`).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The translated text (`<target>`). Empty when the unit has no target.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn handle(&self) -> UnitHandle {
        self.handle
    }
}

/// A single finding for one file, rendered as the plain diagnostic string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The path does not resolve to a regular file.
    FileNotFound,
    /// The file exists but could not be read.
    ReadFailed(String),
    /// The document is not well-formed; carries the parser message.
    XmlError(String),
    /// Parsed cleanly but contains no `trans-unit` inside a `body`.
    NoElementsFound,
    /// The unit's id was replaced; carries the source preview.
    IdFixed { source_preview: String },
    /// The source has a parameter marker the target lacks.
    MissingParameter { source_preview: String },
    /// The corrected content could not be written.
    WriteFailed,
}

impl Diagnostic {
    /// True for diagnostics that mean the file could not be processed.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Diagnostic::FileNotFound
                | Diagnostic::ReadFailed(_)
                | Diagnostic::XmlError(_)
                | Diagnostic::NoElementsFound
                | Diagnostic::WriteFailed
        )
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::FileNotFound => write!(f, "file not found"),
            Diagnostic::ReadFailed(message) => write!(f, "ERROR reading file: {}", message),
            Diagnostic::XmlError(message) => write!(f, "ERROR in xml: {}", message),
            Diagnostic::NoElementsFound => {
                write!(f, "WARNING, no elements found, maybe xml not well-formatted")
            }
            Diagnostic::IdFixed { source_preview } => write!(f, "id of \"{}\"", source_preview),
            Diagnostic::MissingParameter { source_preview } => write!(
                f,
                "TODO include parameters in source \"{}\" (from target )",
                source_preview
            ),
            Diagnostic::WriteFailed => write!(f, "FAILED to write file"),
        }
    }
}

/// How a processed file ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// No diagnostics.
    Clean,
    /// Diagnostics present; rewritten if fixing was requested.
    Fixed,
    /// Missing, unparsable, or the write failed.
    Error,
}

impl Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Clean => write!(f, "clean"),
            FileOutcome::Fixed => write!(f, "fixed"),
            FileOutcome::Error => write!(f, "error"),
        }
    }
}

/// Ordered diagnostics produced for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixReport {
    path: PathBuf,
    diagnostics: Vec<Diagnostic>,
    written: bool,
}

impl FixReport {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            diagnostics: Vec::new(),
            written: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics rendered as plain strings, in order.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Whether anything was reported, which is what triggers a rewrite.
    pub fn has_changes(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Whether the file on disk was replaced.
    pub fn was_written(&self) -> bool {
        self.written
    }

    pub(crate) fn mark_written(&mut self) {
        self.written = true;
    }

    pub fn outcome(&self) -> FileOutcome {
        if self.diagnostics.iter().any(Diagnostic::is_failure) {
            FileOutcome::Error
        } else if self.diagnostics.is_empty() {
            FileOutcome::Clean
        } else {
            FileOutcome::Fixed
        }
    }
}

impl Extend<Diagnostic> for FixReport {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.diagnostics.extend(iter);
    }
}
