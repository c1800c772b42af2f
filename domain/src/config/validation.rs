//! Structured configuration issues.
//!
//! Loaders check configured values and report problems as [`ConfigIssue`]s
//! rather than failing on the first one, so every problem can be shown at
//! once. `Error` issues abort startup; `Warning` issues are printed.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A number is outside its allowed range.
    OutOfRange,
    /// A string names a value that does not exist (rule, policy, provider).
    UnknownValue,
    /// An identifier is empty or blank.
    EmptyId,
    /// Two capabilities share an id.
    DuplicateId,
    /// A custom instruction has no `{query}` placeholder.
    MissingPlaceholder,
    /// The temperature range is inverted.
    InvertedRange,
    /// A disabled capability id matches nothing.
    UnknownCapability,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
