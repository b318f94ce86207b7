use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location pointing at the start of a line
    pub fn line_start(line: usize) -> Self {
        Self { line, column: 1 }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that can occur while composing a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// A configuration field had an invalid value. Raised before scanning.
    #[error("Invalid configuration for `{field}`: {message}")]
    Configuration {
        /// Name of the offending field (boundary name)
        field: &'static str,
        /// Error message
        message: String,
    },
    /// Malformed directive syntax (unterminated callout, bad width annotation).
    #[error("Directive syntax error at {location}: {message}")]
    DirectiveSyntax {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// A `:::kind` opener named a kind outside the supported set.
    #[error("Unknown callout kind at {location}: {kind}")]
    UnknownCalloutKind {
        /// Kind as written in the source
        kind: String,
        /// Source location
        location: SourceLocation,
    },
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Markdown error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location (relative to the segment being rendered)
        location: SourceLocation,
    },
    /// HTML post-processing failed.
    #[error("HTML rewrite error: {0}")]
    Rewrite(String),
}

impl ComposeError {
    /// Create a configuration error for a boundary field
    pub fn configuration(field: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            field,
            message: message.into(),
        }
    }

    /// Create a directive syntax error with location
    pub fn directive_syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::DirectiveSyntax {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// Create an unknown callout kind error with location
    pub fn unknown_callout_kind(kind: impl Into<String>, line: usize, column: usize) -> Self {
        Self::UnknownCalloutKind {
            kind: kind.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// True for every error class the caller should surface as a
    /// directive syntax problem. Unknown callout kinds belong here.
    pub fn is_directive_syntax(&self) -> bool {
        matches!(
            self,
            Self::DirectiveSyntax { .. } | Self::UnknownCalloutKind { .. }
        )
    }

    /// True for configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Source location of the error, if it has one.
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Self::DirectiveSyntax { location, .. }
            | Self::UnknownCalloutKind { location, .. }
            | Self::MarkdownAdapter { location, .. } => Some(*location),
            Self::Configuration { .. } | Self::Rewrite(_) => None,
        }
    }
}

/// Non-fatal warnings that don't prevent rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Code fence opened but never closed
    UnclosedCodeFence {
        /// Source location where the fence started
        location: SourceLocation,
        /// Fence marker character (backtick or tilde)
        marker: char,
    },
}

impl ParseWarning {
    /// Get the location of this warning
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseWarning::UnclosedCodeFence { location, .. } => location,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnclosedCodeFence { location, marker } => {
                write!(
                    f,
                    "Unclosed code fence ({}) opened at {}; it runs to the end of the document",
                    marker, location
                )
            }
        }
    }
}

/// Collection of scan diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<ParseWarning>,
}

impl ParseDiagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
