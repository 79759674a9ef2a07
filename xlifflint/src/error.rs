//! All error types for the xlifflint crate.
//!
//! These are returned from the fallible building blocks (loading, parsing,
//! serializing, replacing files). [`crate::fix_file`] never returns them; it
//! folds every failure into a [`crate::Diagnostic`] instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("nothing was written to {}", .0.display())]
    WriteFailed(PathBuf),
}

impl Error {
    /// Creates a new malformed-document error
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::Malformed(message.into())
    }

    /// The bare parser message, without the variant prefix.
    ///
    /// Used for the `ERROR in xml: ...` diagnostic.
    pub fn parser_message(&self) -> String {
        match self {
            Error::XmlParse(e) => e.to_string(),
            Error::Malformed(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this error describes the document structure rather than the file system.
    pub fn is_xml(&self) -> bool {
        matches!(self, Error::XmlParse(_) | Error::Malformed(_))
    }
}
