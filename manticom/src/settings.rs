//! Settings for a generation run.

/// Settings that control generation and writing behavior.
#[derive(Debug, Clone, Default)]
pub struct GenerateSettings {
    /// When true, existing per-object files in `Objects/` are overwritten.
    ///
    /// **Default: false.** Existing object files are kept so hand edits survive
    /// regeneration; the data-model pair is always rewritten.
    pub force_overwrite: bool,

    /// When true, fail after resolution if the schema produced any
    /// error-severity issue. Collects all issues and returns them together.
    ///
    /// **Default: false (disabled).** This is the lenient default: offending
    /// entries are skipped or degraded and everything else is still generated.
    pub deny_errors: bool,
}
