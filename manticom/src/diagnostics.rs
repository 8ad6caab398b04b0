//! Collects issues across pipeline stages and logs each one as it is reported.

use crate::error::{Issue, IssueKind, SchemaError, Severity};
use crate::pointer::Pointer;

/// Issue sink shared by every resolver stage of one generation run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    issues: Vec<Issue>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an issue and logs it at the level matching its severity.
    pub fn report(&mut self, path: &Pointer, kind: IssueKind) {
        match kind.severity() {
            Severity::Warning => tracing::warn!(path = %path, "{kind}"),
            Severity::Error => tracing::error!(path = %path, "{kind}"),
        }
        self.issues.push(Issue {
            path: path.clone(),
            kind,
        });
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity() == Severity::Error)
    }

    /// Returns true if any recorded issue matches `predicate`.
    pub fn any(&self, predicate: impl Fn(&IssueKind) -> bool) -> bool {
        self.issues.iter().any(|issue| predicate(&issue.kind))
    }

    /// Splits off the error-severity issues for strict mode.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` with every error-severity issue when at least one exists.
    pub fn deny_errors(&self) -> Result<(), SchemaError> {
        let errors: Vec<Issue> = self
            .issues
            .iter()
            .filter(|issue| issue.severity() == Severity::Error)
            .cloned()
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError { issues: errors })
        }
    }

    #[must_use]
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_alone_do_not_count_as_errors() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(&Pointer::root(), IssueKind::UrlNamedNil);
        assert!(!diagnostics.has_errors());
        assert!(diagnostics.deny_errors().is_ok());
        assert_eq!(diagnostics.issues().len(), 1);
    }

    #[test]
    fn deny_errors_keeps_only_errors_in_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(&Pointer::root(), IssueKind::UrlsNotArray);
        diagnostics.report(&Pointer::root(), IssueKind::UrlNamedNil);
        diagnostics.report(&Pointer::root(), IssueKind::ObjectsNotArray);
        let err: SchemaError = diagnostics.deny_errors().unwrap_err();
        let kinds: Vec<&IssueKind> = err.issues.iter().map(|i| &i.kind).collect();
        assert_eq!(
            kinds,
            vec![&IssueKind::UrlsNotArray, &IssueKind::ObjectsNotArray]
        );
    }

    #[test]
    fn any_matches_on_kind() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(
            &Pointer::root(),
            IssueKind::UnknownMetaTag("fast".to_string()),
        );
        assert!(diagnostics.any(|k| matches!(k, IssueKind::UnknownMetaTag(_))));
        assert!(!diagnostics.any(|k| matches!(k, IssueKind::UrlNamedNil)));
    }
}
