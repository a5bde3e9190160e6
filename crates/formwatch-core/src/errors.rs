use formwatch_core_types::{PassId, TraceId};
use thiserror::Error;

/// Result type alias using the canonical ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// test assertions and the webhook's error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Pass-level collaborator failures
    /// The row source could not produce a full table
    SourceUnavailable,
    /// The snapshot store could not be read or written
    StoreUnavailable,
    /// The snapshot changed between load and commit (benign, see `PassReport`)
    VersionConflict,
    /// One notification could not be delivered (never a pass failure)
    DeliveryFailed,

    // Validation
    InvalidInput,
    InvalidTemplate,
    InvalidTimestamp,
    Config,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    ExternalService,
    Timeout,

    // Auth
    Unauthorised,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::SourceUnavailable => "ERR_SOURCE_UNAVAILABLE",
            ExErrorKind::StoreUnavailable => "ERR_STORE_UNAVAILABLE",
            ExErrorKind::VersionConflict => "ERR_VERSION_CONFLICT",
            ExErrorKind::DeliveryFailed => "ERR_DELIVERY_FAILED",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidTemplate => "ERR_INVALID_TEMPLATE",
            ExErrorKind::InvalidTimestamp => "ERR_INVALID_TIMESTAMP",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Unauthorised => "ERR_UNAUTHORISED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Classification fields for programmatic handling plus free-form context
/// for humans reading the logs.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    row_key: Option<String>,
    doc_ref: Option<String>,
    pass_id: Option<PassId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            row_key: None,
            doc_ref: None,
            pass_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the identity key of the row involved
    pub fn with_row_key(mut self, key: impl Into<String>) -> Self {
        self.row_key = Some(key.into());
        self
    }

    /// Add the snapshot document reference involved
    pub fn with_doc_ref(mut self, doc_ref: impl Into<String>) -> Self {
        self.doc_ref = Some(doc_ref.into());
        self
    }

    /// Add pass correlation
    pub fn with_pass_id(mut self, pass_id: PassId) -> Self {
        self.pass_id = Some(pass_id);
        self
    }

    /// Add trigger correlation
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the row key context, if any
    pub fn row_key(&self) -> Option<&str> {
        self.row_key.as_deref()
    }

    /// Get the document reference context, if any
    pub fn doc_ref(&self) -> Option<&str> {
        self.doc_ref.as_deref()
    }

    /// Get the pass id, if any
    pub fn pass_id(&self) -> Option<&PassId> {
        self.pass_id.as_ref()
    }

    /// Get the trace id, if any
    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(row_key) = &self.row_key {
            write!(f, " (row_key: {})", row_key)?;
        }
        if let Some(doc_ref) = &self.doc_ref {
            write!(f, " (doc_ref: {})", doc_ref)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain validation errors raised while interpreting sheet content
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormwatchError {
    /// Template references a placeholder that no column provides
    #[error("Unknown template placeholder: {{{name}}}")]
    UnknownPlaceholder { name: String },

    /// Template has an unmatched brace
    #[error("Unbalanced brace in template at byte {offset}")]
    UnbalancedBrace { offset: usize },

    /// Column names must be unique and non-empty
    #[error("Invalid column name '{name}': {reason}")]
    InvalidColumnName { name: String, reason: String },

    /// Submission timestamp could not be parsed
    #[error("Invalid submission timestamp '{input}': {reason}")]
    InvalidTimestamp { input: String, reason: String },

    /// Recipient could not be resolved for a row
    #[error("No recipient for row {row_key}: {reason}")]
    MissingRecipient { row_key: String, reason: String },
}

impl From<FormwatchError> for ExError {
    fn from(err: FormwatchError) -> Self {
        match err {
            FormwatchError::UnknownPlaceholder { name } => {
                ExError::new(ExErrorKind::InvalidTemplate)
                    .with_op("parse_template")
                    .with_message(format!("unknown placeholder {{{}}}", name))
            }
            FormwatchError::UnbalancedBrace { offset } => {
                ExError::new(ExErrorKind::InvalidTemplate)
                    .with_op("parse_template")
                    .with_message(format!("unbalanced brace at byte {}", offset))
            }
            FormwatchError::InvalidColumnName { name, reason } => {
                ExError::new(ExErrorKind::Config)
                    .with_op("parse_template")
                    .with_message(format!("column '{}': {}", name, reason))
            }
            FormwatchError::InvalidTimestamp { input, reason } => {
                ExError::new(ExErrorKind::InvalidTimestamp)
                    .with_op("parse_submission_timestamp")
                    .with_message(format!("'{}': {}", input, reason))
            }
            FormwatchError::MissingRecipient { row_key, reason } => {
                ExError::new(ExErrorKind::DeliveryFailed)
                    .with_op("resolve_recipient")
                    .with_row_key(row_key)
                    .with_message(reason)
            }
        }
    }
}
