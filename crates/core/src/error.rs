use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
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
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that can occur while highlighting and converting documents.
#[derive(Debug, Error)]
pub enum FencelineError {
    /// IO error while reading input or local resources.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// UTF-8 encoding error.
    #[error("Encoding error: {0}")]
    EncodingError(#[from] std::string::FromUtf8Error),
    /// markdown-rs converter error surfaced through the adapter.
    #[error("Markdown error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// The highlighting engine rejected a block.
    #[error("Highlight error ({language}): {message}")]
    Highlight {
        /// Language the block was tokenized under
        language: String,
        /// Engine message
        message: String,
    },
    /// A remote or local resource could not be fetched.
    #[error("Failed to fetch {location} after {attempts} attempt(s): {message}")]
    ResourceFetch {
        /// URL or path of the resource
        location: String,
        /// Number of attempts made
        attempts: u32,
        /// Last failure message
        message: String,
    },
    /// A fetched grammar or syntax dump could not be loaded into the engine.
    #[error("Failed to load grammar '{name}': {message}")]
    GrammarLoad {
        /// Grammar name
        name: String,
        /// Loader message
        message: String,
    },
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Internal logic error (unexpected state).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl FencelineError {
    /// Create a highlight error for a language
    pub fn highlight(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Highlight {
            language: language.into(),
            message: message.into(),
        }
    }

    /// Create a grammar load error
    pub fn grammar_load(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GrammarLoad {
            name: name.into(),
            message: message.into(),
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
        /// Surrounding context for error message
        context: String,
    },
    /// Diff directive points outside the block's lines and was ignored
    DiffOutOfRange {
        /// Source location of the fence carrying the directive
        location: SourceLocation,
        /// The directive as written
        directive: String,
        /// Number of lines in the normalized block
        line_count: usize,
    },
}

impl ParseWarning {
    /// Get the location of this warning
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseWarning::UnclosedCodeFence { location, .. } => location,
            ParseWarning::DiffOutOfRange { location, .. } => location,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnclosedCodeFence {
                location,
                marker,
                context,
            } => {
                write!(
                    f,
                    "Unclosed code fence ({}): {}, near '{}'",
                    marker, location, context
                )
            }
            ParseWarning::DiffOutOfRange {
                location,
                directive,
                line_count,
            } => {
                write!(
                    f,
                    "{}: diff directive '{}' is outside the block (1..={})",
                    location, directive, line_count
                )
            }
        }
    }
}

/// Recoverable error information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverableError {
    /// Error message
    pub message: String,
    /// Source location
    pub location: SourceLocation,
}

impl RecoverableError {
    /// Create a new recoverable error
    pub fn error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }
}

impl std::fmt::Display for RecoverableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error at {}: {}", self.location, self.message)
    }
}

/// Collection of diagnostics (warnings and recoverable errors) for one conversion
#[derive(Debug, Clone, Default)]
pub struct ParseDiagnostics {
    /// List of non-fatal warnings
    pub warnings: Vec<ParseWarning>,
    /// List of recoverable errors
    pub errors: Vec<RecoverableError>,
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

    /// Add an error with location
    pub fn add_error_at(&mut self, message: impl Into<String>, line: usize, column: usize) {
        self.errors
            .push(RecoverableError::error(message, line, column));
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any diagnostics
    pub fn has_any(&self) -> bool {
        self.has_warnings() || self.has_errors()
    }

    /// Get total count of all diagnostics
    pub fn count(&self) -> usize {
        self.warnings.len() + self.errors.len()
    }
}
