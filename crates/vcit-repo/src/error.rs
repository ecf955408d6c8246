//! Error types for repository operations.

use std::path::PathBuf;

use thiserror::Error;
use vcit_store::StoreError;
use vcit_types::{ObjectId, ObjectKind, TypeError};

/// Errors that can occur while locating, opening or reading a repository.
#[derive(Debug, Error)]
pub enum RepoError {
    /// No control directory was found at or above the path.
    #[error("not a vcit repository: {}", path.display())]
    NotARepository { path: PathBuf },

    /// The control directory has no `config` file.
    #[error("configuration file missing: {}", path.display())]
    MissingConfig { path: PathBuf },

    /// `core.repositoryformatversion` is not `0`.
    #[error("unsupported repositoryformatversion {0:?}")]
    UnsupportedFormatVersion(String),

    /// The config file exists but cannot be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A path that must be a directory is something else.
    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// `init` was pointed at a directory that already has content.
    #[error("{} is not empty", path.display())]
    NotEmpty { path: PathBuf },

    /// No object with this id exists in the store.
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// A name matched neither a ref nor a stored object.
    #[error("no such reference: {0}")]
    NameNotFound(String),

    /// A name matched more than one distinct object.
    #[error("ambiguous reference {name}: candidates are {}", format_ids(candidates))]
    AmbiguousName {
        name: String,
        candidates: Vec<ObjectId>,
    },

    /// A ref name breaks the naming rules.
    #[error("invalid ref name {name:?}: {reason}")]
    InvalidRefName { name: String, reason: String },

    /// Peeling an object did not reach the requested kind.
    #[error("{id} is a {actual}, not a {expected}")]
    KindMismatch {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// Symbolic refs point at each other, or the chain is too long.
    #[error("symbolic ref loop at {0}")]
    SymbolicRefLoop(String),

    /// Object store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An identifier could not be parsed.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// I/O error on the control directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_ids(ids: &[ObjectId]) -> String {
    ids.iter()
        .map(ObjectId::to_hex)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience type alias for repository operations.
pub type RepoResult<T> = std::result::Result<T, RepoError>;
