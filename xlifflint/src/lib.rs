#![forbid(unsafe_code)]
//! XLIFF translation file linter and fixer.
//!
//! Every `trans-unit` id must be traceable to its source text. Ids that are
//! empty, contain a parameter marker, or do not appear in the source are
//! replaced by an id derived deterministically from the source text, and the
//! file is written back through a backup-then-swap replace.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlifflint::{FixOptions, fix_file};
//!
//! let report = fix_file("translations/messages.de.xlf", &FixOptions::new().with_fix(true));
//! for message in report.messages() {
//!     println!(" * {}", message);
//! }
//! ```

pub mod document;
pub mod error;
pub mod fixer;
pub mod inspector;
pub mod options;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    document::XliffDocument,
    error::Error,
    fixer::fix_file,
    inspector::{IdVerdict, InvalidReason, check_unit, derive_id, evaluate_id},
    options::FixOptions,
    types::{Diagnostic, FileOutcome, FixReport, TranslationUnit},
};
