//! Read-only access to refs.
//!
//! A ref is a file under the control directory holding either a 40-hex
//! object id or `ref: <other ref name>`.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, warn};
use vcit_types::ObjectId;
use walkdir::WalkDir;

use crate::error::{RepoError, RepoResult};
use crate::repository::Repository;

/// Symbolic refs are followed at most this many times.
pub const MAX_SYMREF_DEPTH: usize = 16;

const SYMREF_PREFIX: &str = "ref:";

/// The parsed contents of a ref file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    /// Points straight at an object.
    Direct(ObjectId),
    /// Names another ref, e.g. `refs/heads/master`.
    Symbolic(String),
}

impl Reference {
    pub fn parse(contents: &str) -> RepoResult<Self> {
        let contents = contents.trim();
        match contents.strip_prefix(SYMREF_PREFIX) {
            Some(target) => Ok(Self::Symbolic(target.trim().to_string())),
            None => Ok(Self::Direct(ObjectId::from_hex(contents)?)),
        }
    }
}

/// A ref name and the object it finally resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RefEntry {
    pub name: String,
    pub id: ObjectId,
}

/// Read a single ref file without following it.
///
/// `name` is relative to the control directory (`HEAD`,
/// `refs/heads/master`). Returns `Ok(None)` if no such file exists.
pub fn read_ref(repo: &Repository, name: &str) -> RepoResult<Option<Reference>> {
    let path = ref_path(repo, name);
    if !path.is_file() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path)?;
    Reference::parse(&contents).map(Some)
}

/// Follow `name` through symbolic refs to an object id.
///
/// Returns `Ok(None)` if the chain ends at a missing ref (an unborn branch).
pub fn resolve_ref(repo: &Repository, name: &str) -> RepoResult<Option<ObjectId>> {
    let mut current = name.to_string();
    for _ in 0..=MAX_SYMREF_DEPTH {
        match read_ref(repo, &current)? {
            None => return Ok(None),
            Some(Reference::Direct(id)) => return Ok(Some(id)),
            Some(Reference::Symbolic(target)) => current = target,
        }
    }
    Err(RepoError::SymbolicRefLoop(name.to_string()))
}

/// The commit `HEAD` resolves to, if any.
pub fn head(repo: &Repository) -> RepoResult<Option<ObjectId>> {
    resolve_ref(repo, "HEAD")
}

/// Every ref under `refs/` that resolves to an object, sorted by name.
///
/// Dangling and unparsable refs are skipped with a warning.
pub fn list_refs(repo: &Repository) -> RepoResult<Vec<RefEntry>> {
    let root = repo.resolve(&["refs"]);
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(&root) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(repo.control_dir()) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        match resolve_ref(repo, &name) {
            Ok(Some(id)) => entries.push(RefEntry { name, id }),
            Ok(None) => warn!(%name, "skipping dangling ref"),
            Err(RepoError::Type(e)) => warn!(%name, error = %e, "skipping unparsable ref"),
            Err(e) => return Err(e),
        }
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = entries.len(), "listed refs");
    Ok(entries)
}

fn ref_path(repo: &Repository, name: &str) -> PathBuf {
    let segments: Vec<&str> = name.split('/').collect();
    repo.resolve(&segments)
}
