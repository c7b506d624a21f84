/// Fatal errors: these abort the whole run.
///
/// Everything that can be downgraded to a warning-plus-placeholder is a
/// `Diagnostic` instead; the dictionary must still be produced for the
/// definitions that did compile.
#[derive(Debug, Clone)]
pub enum CompileError {
    /// A literal string exceeds the 255-byte length prefix
    StringTooLong { len: usize },

    /// A bootstrap word the compiler needs as input is missing from the
    /// native catalog
    MissingBootstrapWord { constant: String },

    /// Two words claim the same constant identifier
    DuplicateConstant {
        constant: String,
        first: String,
        second: String,
    },
}

impl CompileError {
    pub fn string_too_long(len: usize) -> Self {
        CompileError::StringTooLong { len }
    }

    pub fn missing_bootstrap(constant: impl Into<String>) -> Self {
        CompileError::MissingBootstrapWord {
            constant: constant.into(),
        }
    }

    pub fn duplicate_constant(
        constant: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        CompileError::DuplicateConstant {
            constant: constant.into(),
            first: first.into(),
            second: second.into(),
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::StringTooLong { len } => {
                write!(f, "literal string of {} bytes exceeds 255", len)
            }
            CompileError::MissingBootstrapWord { constant } => {
                write!(
                    f,
                    "native catalog has no word with constant '{}' (needed before any definition can compile)",
                    constant
                )
            }
            CompileError::DuplicateConstant {
                constant,
                first,
                second,
            } => {
                write!(
                    f,
                    "constant '{}' is claimed by both '{}' and '{}'",
                    constant, first, second
                )
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// A recoverable resolution problem: reported, substituted with a
/// placeholder, and compilation continues.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// A plain token is neither a known word nor a parseable integer
    UnresolvedWordOrLiteral,

    /// A `%NAME` matched no constant anywhere in the run
    UnresolvedForwardReference,

    /// A label was used but never defined within the same word
    UnresolvedLabel,

    /// A definition line is missing its `:` marker or name
    MalformedDefinitionHeader,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Name of the definition being compiled, when known
    pub word: Option<String>,
    pub detail: String,
}

impl Diagnostic {
    pub fn unresolved_word(word: &str, token: &str) -> Self {
        Diagnostic {
            kind: DiagnosticKind::UnresolvedWordOrLiteral,
            word: Some(word.to_string()),
            detail: format!("'{}' is neither a known word nor an integer", token),
        }
    }

    pub fn unresolved_forward(word: &str, name: &str) -> Self {
        Diagnostic {
            kind: DiagnosticKind::UnresolvedForwardReference,
            word: Some(word.to_string()),
            detail: format!("%{} matches no constant in the whole run", name),
        }
    }

    pub fn unresolved_label(word: &str, name: &str) -> Self {
        Diagnostic {
            kind: DiagnosticKind::UnresolvedLabel,
            word: Some(word.to_string()),
            detail: format!(
                "label {}: is never defined here; a zero offset jump was substituted",
                name
            ),
        }
    }

    pub fn malformed_header(raw: &str, reason: &str) -> Self {
        let head: String = raw.chars().take(40).collect();
        Diagnostic {
            kind: DiagnosticKind::MalformedDefinitionHeader,
            word: None,
            detail: format!("{}: '{}'", reason, head.trim_end()),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.word {
            Some(word) => write!(f, "warning: in '{}': {}", word, self.detail),
            None => write!(f, "warning: {}", self.detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_error_display() {
        let err = CompileError::string_too_long(300);
        assert!(err.to_string().contains("300"));
        assert!(err.to_string().contains("255"));

        let err = CompileError::missing_bootstrap("int");
        assert!(err.to_string().contains("'int'"));

        let err = CompileError::duplicate_constant("X", "foo", "bar");
        let msg = err.to_string();
        assert!(msg.contains("'X'"));
        assert!(msg.contains("'foo'"));
        assert!(msg.contains("'bar'"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = CompileError::string_too_long(256);
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_diagnostic_display_names_the_word() {
        let d = Diagnostic::unresolved_word("double", "bogus");
        let msg = d.to_string();
        assert!(msg.contains("'double'"));
        assert!(msg.contains("'bogus'"));
    }

    #[test]
    fn test_malformed_header_truncates_long_lines() {
        let raw = "x".repeat(200);
        let d = Diagnostic::malformed_header(&raw, "missing ':' marker");
        assert!(d.to_string().len() < 120);
    }
}
