//! Id policy for translation units.
//!
//! An id must be non-empty, must not contain the parameter marker `" %"` and
//! must be traceable back to the unit's source text. Ids that break the policy
//! are replaced by one derived deterministically from the source text.

use log::debug;
use md5::{Digest, Md5};

use crate::types::{Diagnostic, TranslationUnit};

/// Start of a printf-style parameter list in source texts.
pub const PARAMETER_MARKER: &str = " %";

/// Longest id produced by the hashing branch of [`derive_id`].
pub const MAX_ID_LEN: usize = 64;

const HASH_LEN: usize = 8;
const HASH_OFFSET: usize = 3;
const PREVIEW_LEN: usize = 128;

/// Why an id was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    Empty,
    ContainsParameter,
    NotInSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdVerdict {
    Valid,
    Invalid(InvalidReason),
}

impl IdVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, IdVerdict::Valid)
    }
}

/// Checks `id` against the policy for a unit whose source text is `source`.
///
/// The containment check is a plain substring test against the source and
/// against its lowercase form, so `id` must already be lowercase to match a
/// capitalized source.
pub fn evaluate_id(id: &str, source: &str) -> IdVerdict {
    if id.is_empty() {
        IdVerdict::Invalid(InvalidReason::Empty)
    } else if id.contains(PARAMETER_MARKER) {
        IdVerdict::Invalid(InvalidReason::ContainsParameter)
    } else if !source.contains(id) && !source.to_lowercase().contains(id) {
        IdVerdict::Invalid(InvalidReason::NotInSource)
    } else {
        IdVerdict::Valid
    }
}

/// Derives the replacement id for `source`.
///
/// 1. Text before the first `" %"`, if there is one.
/// 2. For long texts with a space: the first 55 characters, `_`, and 8 hex
///    characters of the MD5 digest of the whole text.
/// 3. The source text itself.
pub fn derive_id(source: &str) -> String {
    if let Some(pos) = source.find(PARAMETER_MARKER) {
        return source[..pos].to_string();
    }
    if source.contains(' ') && source.chars().count() > MAX_ID_LEN {
        let prefix: String = source.chars().take(MAX_ID_LEN - HASH_LEN - 1).collect();
        return format!("{}_{}", prefix, content_hash(source));
    }
    source.to_string()
}

/// Eight hex characters of the MD5 digest of `text`, starting at offset 3.
fn content_hash(text: &str) -> String {
    let digest = format!("{:x}", Md5::digest(text.as_bytes()));
    digest[HASH_OFFSET..HASH_OFFSET + HASH_LEN].to_string()
}

/// Source text shortened for diagnostics, with newlines shown as `\n`.
pub fn source_preview(source: &str) -> String {
    source
        .replace('\n', "\\n")
        .chars()
        .take(PREVIEW_LEN)
        .collect()
}

/// Validates one unit, repairing its id in place when needed.
///
/// Returns the diagnostics for the unit: the id fix first, then the
/// missing-parameter warning. A changed id also drops the `resname`
/// attribute, which would otherwise keep naming the old id.
pub fn check_unit(unit: &mut TranslationUnit) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if let IdVerdict::Invalid(reason) = evaluate_id(&unit.id, unit.source()) {
        let new_id = derive_id(unit.source());
        if new_id != unit.id {
            debug!("replacing id {:?} ({:?}) with {:?}", unit.id, reason, new_id);
            unit.id = new_id;
            unit.resname = None;
            diagnostics.push(Diagnostic::IdFixed {
                source_preview: source_preview(unit.source()),
            });
        }
    }

    if unit.source().contains(PARAMETER_MARKER) && !unit.target().contains(PARAMETER_MARKER) {
        diagnostics.push(Diagnostic::MissingParameter {
            source_preview: source_preview(unit.source()),
        });
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_exact_substring() {
        assert_eq!(evaluate_id("Hello", "Hello World"), IdVerdict::Valid);
    }

    #[test]
    fn test_valid_lowercase_substring() {
        assert!(evaluate_id("hello world", "Hello World").is_valid());
        // only the source is lowercased, never the id
        assert!(!evaluate_id("HELLO", "Hello World").is_valid());
    }

    #[test]
    fn test_invalid_reasons() {
        assert_eq!(
            evaluate_id("", "Hello"),
            IdVerdict::Invalid(InvalidReason::Empty)
        );
        assert_eq!(
            evaluate_id("Pay %1", "Pay %1 now"),
            IdVerdict::Invalid(InvalidReason::ContainsParameter)
        );
        assert_eq!(
            evaluate_id("greeting", "Hello World"),
            IdVerdict::Invalid(InvalidReason::NotInSource)
        );
    }

    #[test]
    fn test_derive_id_verbatim() {
        assert_eq!(derive_id("Hello World"), "Hello World");
    }

    #[test]
    fn test_derive_id_parameter_prefix() {
        assert_eq!(derive_id("Pay %1 now"), "Pay");
        assert_eq!(derive_id("Deleted %count% items of %total%"), "Deleted");
    }

    #[test]
    fn test_derive_id_long_text_is_hashed() {
        let source = "This sentence is deliberately long so that it exceeds the limit of ids.";
        assert!(source.chars().count() > MAX_ID_LEN);

        let id = derive_id(source);
        assert_eq!(id.chars().count(), MAX_ID_LEN);
        assert_eq!(&id[..55], &source[..55]);
        assert_eq!(&id[55..56], "_");
        assert!(id[56..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, derive_id(source));
    }

    #[test]
    fn test_derive_id_long_text_without_space_is_verbatim() {
        let source = "x".repeat(80);
        assert_eq!(derive_id(&source), source);
    }

    #[test]
    fn test_content_hash_known_value() {
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(content_hash(""), "d8cd98f0");
    }

    #[test]
    fn test_source_preview() {
        assert_eq!(source_preview("a\nb"), "a\\nb");
        assert_eq!(source_preview(&"y".repeat(300)).chars().count(), 128);
    }

    #[test]
    fn test_check_unit_fixes_id_and_drops_resname() {
        let mut unit = TranslationUnit::detached("greeting", "Hello World", "Hallo Welt")
            .with_resname("greeting");
        let diagnostics = check_unit(&mut unit);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::IdFixed {
                source_preview: "Hello World".to_string()
            }]
        );
        assert_eq!(unit.id, "Hello World");
        assert_eq!(unit.resname, None);
    }

    #[test]
    fn test_check_unit_valid_id_untouched() {
        let mut unit = TranslationUnit::detached("hello", "Hello", "Hallo").with_resname("hello");
        assert!(check_unit(&mut unit).is_empty());
        assert_eq!(unit.id, "hello");
        assert_eq!(unit.resname.as_deref(), Some("hello"));
    }

    #[test]
    fn test_check_unit_empty_id_with_parameter() {
        let mut unit = TranslationUnit::detached("", "Pay %1 now", "Zahle %1 jetzt");
        let diagnostics = check_unit(&mut unit);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(unit.id, "Pay");
    }

    #[test]
    fn test_check_unit_missing_parameter_after_id_fix() {
        let mut unit = TranslationUnit::detached("x", "Pay %1 now", "Jetzt zahlen");
        let diagnostics = check_unit(&mut unit);
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(diagnostics[0], Diagnostic::IdFixed { .. }));
        assert!(matches!(diagnostics[1], Diagnostic::MissingParameter { .. }));
    }

    #[test]
    fn test_check_unit_hashed_id_is_stable() {
        let source = "A rather long sentence that needs to be shortened before it can be an id";
        let mut unit = TranslationUnit::detached("x", source, "t");
        assert_eq!(check_unit(&mut unit).len(), 1);
        let fixed = unit.id.clone();
        assert!(check_unit(&mut unit).is_empty());
        assert_eq!(unit.id, fixed);
    }
}
