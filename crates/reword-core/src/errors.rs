use reword_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using RewordError
pub type Result<T> = std::result::Result<T, RewordError>;

/// Result type alias using the canonical ExError
///
/// Everything that crosses a store or engine boundary returns this.
pub type ExResult<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (the CLI, tests,
/// wrapping tools) can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Lookup
    NotFound,
    AmbiguousOrUnknownRevision,

    // Input
    InvalidInput,
    DetachedHead,

    // Store
    StoreWrite,
    CorruptObject,
    Concurrency,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AmbiguousOrUnknownRevision => "ERR_AMBIGUOUS_OR_UNKNOWN_REVISION",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::DetachedHead => "ERR_DETACHED_HEAD",
            ExErrorKind::StoreWrite => "ERR_STORE_WRITE",
            ExErrorKind::CorruptObject => "ERR_CORRUPT_OBJECT",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context (operation, snapshot, reference, revision expression) for humans.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    snapshot_id: Option<String>,
    ref_name: Option<String>,
    revision: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    candidates: Option<Vec<String>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            snapshot_id: None,
            ref_name: None,
            revision: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            candidates: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add snapshot id context
    pub fn with_snapshot_id(mut self, id: impl Into<String>) -> Self {
        self.snapshot_id = Some(id.into());
        self
    }

    /// Add reference name context
    pub fn with_ref_name(mut self, name: impl Into<String>) -> Self {
        self.ref_name = Some(name.into());
        self
    }

    /// Add revision expression context
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add candidate snapshot ids (used when a revision prefix is ambiguous)
    pub fn with_candidates(mut self, ids: Vec<String>) -> Self {
        self.candidates = Some(ids);
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn snapshot_id(&self) -> Option<&str> {
        self.snapshot_id.as_deref()
    }

    pub fn ref_name(&self) -> Option<&str> {
        self.ref_name.as_deref()
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn candidates(&self) -> Option<&[String]> {
        self.candidates.as_deref()
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
        if let Some(revision) = &self.revision {
            write!(f, " (revision: {})", revision)?;
        }
        if let Some(snapshot_id) = &self.snapshot_id {
            write!(f, " (snapshot: {})", snapshot_id)?;
        }
        if let Some(ref_name) = &self.ref_name {
            write!(f, " (ref: {})", ref_name)?;
        }
        if let Some(candidates) = &self.candidates {
            write!(f, " (candidates: {})", candidates.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for history rewriting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewordError {
    // ===== Lookup Errors =====
    /// Snapshot is not present in the object store
    #[error("Snapshot not found: {snapshot_id}")]
    SnapshotNotFound { snapshot_id: String },

    /// Snapshot exists but is not an ancestor of the walk start
    #[error("Snapshot {snapshot_id} is not in the history of {start_id}")]
    NotInHistory {
        snapshot_id: String,
        start_id: String,
    },

    /// Revision expression names nothing
    #[error("Unknown revision: {revision}")]
    UnknownRevision { revision: String },

    /// Abbreviated id matches more than one snapshot
    #[error("Ambiguous revision {revision}: matches {candidates:?}")]
    AmbiguousRevision {
        revision: String,
        candidates: Vec<String>,
    },

    /// Revision expression cannot be parsed
    #[error("Invalid revision {revision}: {reason}")]
    InvalidRevision { revision: String, reason: String },

    /// Reference does not exist or has no target yet
    #[error("Reference not found: {ref_name}")]
    RefNotFound { ref_name: String },

    // ===== Input Errors =====
    /// String is not a well-formed snapshot id
    #[error("Invalid snapshot id: {value}")]
    InvalidSnapshotId { value: String },

    /// HEAD does not point at a branch
    #[error("HEAD is detached; name the reference to rewrite explicitly")]
    DetachedHead,

    /// Edited message is empty
    #[error("Empty message")]
    EmptyMessage,

    // ===== Store Errors =====
    /// Creating a snapshot failed
    #[error("Store write failed: {reason}")]
    StoreWrite { reason: String },

    /// A stored snapshot record cannot be decoded or does not match its id
    #[error("Corrupt snapshot {snapshot_id}: {reason}")]
    CorruptSnapshot { snapshot_id: String, reason: String },

    /// Reference moved since the session observed it
    #[error("Reference {ref_name} moved: expected {expected:?}, found {actual:?}")]
    RefMoved {
        ref_name: String,
        expected: Option<String>,
        actual: Option<String>,
    },

    // ===== Generic Errors =====
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<RewordError> for ExError {
    fn from(err: RewordError) -> Self {
        match err {
            RewordError::SnapshotNotFound { snapshot_id } => ExError::new(ExErrorKind::NotFound)
                .with_snapshot_id(snapshot_id)
                .with_message("Snapshot not found"),

            RewordError::NotInHistory {
                snapshot_id,
                start_id,
            } => ExError::new(ExErrorKind::NotFound)
                .with_snapshot_id(snapshot_id)
                .with_message(format!("Snapshot is not in the history of {}", start_id)),

            RewordError::UnknownRevision { revision } => {
                ExError::new(ExErrorKind::AmbiguousOrUnknownRevision)
                    .with_revision(revision)
                    .with_message("Unknown revision")
            }

            RewordError::AmbiguousRevision {
                revision,
                candidates,
            } => ExError::new(ExErrorKind::AmbiguousOrUnknownRevision)
                .with_revision(revision)
                .with_candidates(candidates)
                .with_message("Ambiguous revision"),

            RewordError::InvalidRevision { revision, reason } => {
                ExError::new(ExErrorKind::AmbiguousOrUnknownRevision)
                    .with_revision(revision)
                    .with_message(format!("Invalid revision: {}", reason))
            }

            RewordError::RefNotFound { ref_name } => ExError::new(ExErrorKind::NotFound)
                .with_ref_name(ref_name)
                .with_message("Reference not found"),

            RewordError::InvalidSnapshotId { value } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid snapshot id: {}", value)),

            RewordError::DetachedHead => ExError::new(ExErrorKind::DetachedHead)
                .with_ref_name("HEAD")
                .with_message("HEAD is detached"),

            RewordError::EmptyMessage => {
                ExError::new(ExErrorKind::InvalidInput).with_message("Empty message")
            }

            RewordError::StoreWrite { reason } => ExError::new(ExErrorKind::StoreWrite)
                .with_op("create_snapshot")
                .with_message(reason),

            RewordError::CorruptSnapshot {
                snapshot_id,
                reason,
            } => ExError::new(ExErrorKind::CorruptObject)
                .with_snapshot_id(snapshot_id)
                .with_message(reason),

            RewordError::RefMoved {
                ref_name,
                expected,
                actual,
            } => ExError::new(ExErrorKind::Concurrency)
                .with_ref_name(ref_name)
                .with_message(format!(
                    "Expected {} but found {}",
                    expected.as_deref().unwrap_or("<unborn>"),
                    actual.as_deref().unwrap_or("<unborn>")
                )),

            RewordError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            RewordError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for RewordError {
    fn from(err: serde_json::Error) -> Self {
        RewordError::Serialization {
            message: err.to_string(),
        }
    }
}
