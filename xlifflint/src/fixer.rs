//! Per-file check and repair.
//!
//! [`fix_file`] loads one XLIFF file, runs every unit through
//! [`check_unit`], and when anything was reported serializes the document and
//! (in fix mode) swaps it into place:
//!
//! 1. the new content is written to `<path>#`,
//! 2. `<path>` is renamed to `<path>~`,
//! 3. `<path>#` is renamed to `<path>`.
//!
//! If step 1 fails the original file is never touched.

use std::{
    ffi::OsString,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, warn};

use crate::{
    document::{XliffDocument, reindent, restore_namespace_declaration},
    error::Error,
    inspector::check_unit,
    options::FixOptions,
    types::{Diagnostic, FixReport},
};

/// Checks one file and, if `options.fix` is set, rewrites it.
///
/// Never fails: a missing file, malformed XML or a failed write are all
/// reported as diagnostics so a batch can carry on with the next file.
pub fn fix_file<P: AsRef<Path>>(path: P, options: &FixOptions) -> FixReport {
    let path = path.as_ref();
    let mut report = FixReport::new(path);

    let mut document = match XliffDocument::read_from(path) {
        Ok(document) => document,
        Err(e) => {
            debug!("{}: load failed: {}", path.display(), e);
            report.push(load_diagnostic(&e));
            return report;
        }
    };

    if document.units().is_empty() {
        report.push(Diagnostic::NoElementsFound);
        return report;
    }

    for unit in document.units_mut() {
        report.extend(check_unit(unit));
    }

    if !report.has_changes() {
        debug!("{}: clean", path.display());
        return report;
    }

    let content = match render(&document, options.reindent) {
        Ok(content) => content,
        Err(e) => {
            report.push(Diagnostic::XmlError(e.parser_message()));
            return report;
        }
    };

    if !options.fix {
        return report;
    }

    match replace_file(path, &content) {
        Ok(()) => {
            debug!("{}: rewritten ({} bytes)", path.display(), content.len());
            report.mark_written();
        }
        Err(e) => {
            warn!("{}: {}", path.display(), e);
            report.push(Diagnostic::WriteFailed);
        }
    }
    report
}

fn load_diagnostic(error: &Error) -> Diagnostic {
    match error {
        Error::NotFound(_) => Diagnostic::FileNotFound,
        e if e.is_xml() => Diagnostic::XmlError(e.parser_message()),
        e => Diagnostic::ReadFailed(e.parser_message()),
    }
}

/// Serializes `document` as the bytes to write back.
pub fn render(document: &XliffDocument, reindented: bool) -> Result<Vec<u8>, Error> {
    let mut xml = document.to_xml()?;
    if reindented {
        xml = reindent(&xml)?;
    }
    Ok(restore_namespace_declaration(xml.as_bytes()))
}

/// `<path>#`, the temporary file a fix is written to.
pub fn temp_path(path: &Path) -> PathBuf {
    with_suffix(path, "#")
}

/// `<path>~`, where the original content is kept after a fix.
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, "~")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Replaces `path` with `content`, keeping the old file as its backup.
///
/// `path` is only renamed after the temporary file was written completely.
/// Should the final rename fail, the backup is moved back.
pub fn replace_file(path: &Path, content: &[u8]) -> Result<(), Error> {
    let temp = temp_path(path);
    let backup = backup_path(path);

    let written = match write_temp(&temp, content) {
        Ok(written) => written,
        Err(e) => {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
    };
    if written == 0 {
        let _ = fs::remove_file(&temp);
        return Err(Error::WriteFailed(temp));
    }

    fs::rename(path, &backup)?;
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::rename(&backup, path);
        return Err(Error::Io(e));
    }
    Ok(())
}

fn write_temp(temp: &Path, content: &[u8]) -> Result<usize, Error> {
    let mut file = File::create(temp)?;
    file.write_all(content)?;
    file.sync_all()?;
    Ok(content.len())
}
