use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
        })
    }
}

/// One finding about a plan, located by JSON pointer into the plan document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    /// Stable machine-readable code such as `category_not_found`.
    pub code: String,
    pub path: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ValidationIssue {
    pub fn error(code: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_severity(IssueSeverity::Error, code, path, message)
    }

    pub fn warning(code: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_severity(IssueSeverity::Warning, code, path, message)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    fn with_severity(
        severity: IssueSeverity,
        code: &str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.to_string(),
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity, self.code, self.path, self.message
        )?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}

/// Findings split by severity. A plan is usable while `errors` is empty.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// File `issue` under its severity.
    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            IssueSeverity::Error => self.errors.push(issue),
            IssueSeverity::Warning => self.warnings.push(issue),
        }
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Errors first, then warnings.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Promote every warning to an error, for strict runs.
    pub fn escalate_warnings(mut self) -> Self {
        for mut issue in self.warnings.drain(..) {
            issue.severity = IssueSeverity::Error;
            self.errors.push(issue);
        }
        self
    }
}

/// Failures to read or decode a plan, as opposed to findings about its content.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("cannot read plan: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON plan: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed TOML plan: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("plan JSON Schema does not compile: {0}")]
    Schema(String),
}

pub type Result<T> = std::result::Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_display_includes_hint() {
        let issue = ValidationIssue::error("invalid_batch_size", "/batch_size", "must be positive")
            .with_hint("default is 10");
        assert_eq!(
            issue.to_string(),
            "error [invalid_batch_size] /batch_size: must be positive (hint: default is 10)"
        );
    }
}
