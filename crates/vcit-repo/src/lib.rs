//! Repository layer for vcit.
//!
//! A repository is a worktree with a `.vcit` control directory holding the
//! configuration, refs and the loose object store. This crate finds and
//! opens repositories, reads their refs, and resolves user-supplied names
//! to object ids.
//!
//! # Modules
//!
//! - [`repository`] — [`Repository`] handle: discovery, path resolution, `init`
//! - [`config`] — INI configuration and its typed `[core]` view
//! - [`refs`] — Reading and enumerating refs
//! - [`names`] — Ref name validation, name resolution and peeling
//! - [`error`] — Error types for repository operations

pub mod config;
pub mod error;
pub mod names;
pub mod refs;
pub mod repository;

use std::path::{Path, PathBuf};

use vcit_store::{Object, ObjectStore};
use vcit_types::ObjectId;

pub use config::{CoreConfig, RepoConfig};
pub use error::{RepoError, RepoResult};
pub use names::{find_object, resolve_name, validate_ref_name};
pub use refs::{RefEntry, Reference};
pub use repository::{Repository, CONTROL_DIR};

/// Create a new repository at `path`.
pub fn init(path: impl Into<PathBuf>) -> RepoResult<Repository> {
    Repository::init(path)
}

/// Find the repository containing `path`.
///
/// Returns `Ok(None)` if there is none and `required` is false.
pub fn locate(path: impl AsRef<Path>, required: bool) -> RepoResult<Option<Repository>> {
    Repository::find_root(path, required)
}

/// Compute an object's id, storing it in `repo` when `persist` is set.
pub fn write_object(repo: &Repository, object: &Object, persist: bool) -> RepoResult<ObjectId> {
    let store = repo.objects();
    let id = if persist {
        store.write(object)?
    } else {
        store.hash(object)?
    };
    Ok(id)
}

/// Read an object that must exist.
pub fn read_object(repo: &Repository, id: &ObjectId) -> RepoResult<Object> {
    repo.objects()
        .read(id)?
        .ok_or(RepoError::ObjectNotFound(*id))
}
