//! Options controlling what [`crate::fix_file`] does with the diagnostics it finds.

/// Behavior options for [`crate::fix_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixOptions {
    /// Replace the file on disk. When false the run is report-only and touches nothing.
    pub fix: bool,
    /// Pretty-print the rewritten document with 4-space indentation.
    pub reindent: bool,
}

impl FixOptions {
    /// Creates default (report-only) options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables/disables writing the corrected file.
    pub fn with_fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    /// Enables/disables reindentation of the rewritten document.
    pub fn with_reindent(mut self, reindent: bool) -> Self {
        self.reindent = reindent;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_report_only() {
        let options = FixOptions::new();
        assert!(!options.fix);
        assert!(!options.reindent);
    }

    #[test]
    fn test_builder() {
        let options = FixOptions::new().with_fix(true).with_reindent(true);
        assert_eq!(
            options,
            FixOptions {
                fix: true,
                reindent: true
            }
        );
    }
}
