use vcit_types::{ObjectId, TypeError};

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The decoded header does not describe the bytes that follow it.
    #[error("malformed object: {reason}")]
    MalformedObject { reason: String },

    /// The header names a kind outside `{blob, tree, commit, tag}`.
    #[error("unknown object kind: {0:?}")]
    UnknownObjectKind(String),

    /// A key-value-list-with-message record could not be parsed.
    #[error("malformed record at offset {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: String },

    /// A record key is empty or contains a space or newline.
    #[error("invalid record key {0:?}")]
    InvalidKey(String),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {id}: computed {computed}")]
    HashMismatch { id: ObjectId, computed: ObjectId },

    /// The operation exists but has no implementation.
    #[error("{0} is not implemented")]
    Unimplemented(&'static str),

    /// An identifier or kind could not be parsed.
    #[error(transparent)]
    Type(TypeError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TypeError> for StoreError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnknownObjectKind(name) => Self::UnknownObjectKind(name),
            other => Self::Type(other),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
