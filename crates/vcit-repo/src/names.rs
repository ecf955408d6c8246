//! Ref name validation and name-to-object resolution.
//!
//! Valid ref names:
//! - Must be non-empty
//! - Must not contain whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\`
//! - Must not contain `..` (double dot) or `@{`
//! - Must not start or end with `.` or `/`
//! - Must not end with `.lock`
//! - Must not contain consecutive slashes (`//`)
//! - Components between slashes must be non-empty and not start with `.`

use tracing::debug;
use vcit_store::{Object, ObjectStore};
use vcit_types::object::OBJECT_ID_HEX_LEN;
use vcit_types::{ObjectId, ObjectKind};

use crate::error::{RepoError, RepoResult};
use crate::refs;
use crate::repository::Repository;

/// Characters that are forbidden anywhere in a ref name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

/// Shortest hex prefix accepted as an abbreviated object id.
pub const MIN_ABBREV_LEN: usize = 4;

/// Validate a ref name such as `master`, `feature/auth` or
/// `refs/tags/v1.0`.
///
/// # Examples
///
/// ```
/// use vcit_repo::names::validate_ref_name;
///
/// assert!(validate_ref_name("master").is_ok());
/// assert!(validate_ref_name("feature/auth").is_ok());
/// assert!(validate_ref_name("").is_err());
/// assert!(validate_ref_name("bad..name").is_err());
/// ```
pub fn validate_ref_name(name: &str) -> RepoResult<()> {
    let invalid = |reason: String| RepoError::InvalidRefName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("ref name must not be empty".into()));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }
    if name.contains("..") {
        return Err(invalid("must not contain '..'".into()));
    }
    if name.contains("@{") {
        return Err(invalid("must not contain '@{'".into()));
    }
    if name.starts_with('.') || name.ends_with('.') {
        return Err(invalid("must not start or end with '.'".into()));
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(invalid("must not start or end with '/'".into()));
    }
    if name.ends_with(".lock") {
        return Err(invalid("must not end with '.lock'".into()));
    }
    if name.contains("//") {
        return Err(invalid("must not contain consecutive slashes '//'".into()));
    }
    if let Some(component) = name.split('/').find(|c| c.starts_with('.')) {
        return Err(invalid(format!(
            "component must not start with '.': {component:?}"
        )));
    }
    Ok(())
}

/// Resolve a user-supplied name to exactly one object id.
pub fn resolve_name(repo: &Repository, name: &str) -> RepoResult<ObjectId> {
    let found = candidates(repo, name)?;
    match found.len() {
        0 => Err(RepoError::NameNotFound(name.to_string())),
        1 => Ok(found[0]),
        _ => Err(RepoError::AmbiguousName {
            name: name.to_string(),
            candidates: found,
        }),
    }
}

/// Every distinct object `name` could refer to, sorted.
///
/// Tried in turn: `HEAD`, a full hex id, an abbreviated hex id matched
/// against stored objects, `refs/tags/<name>`, `refs/heads/<name>` and a
/// full `refs/...` name. A full hex id is taken as-is, stored or not.
pub fn candidates(repo: &Repository, name: &str) -> RepoResult<Vec<ObjectId>> {
    let name = name.trim();
    let mut found = Vec::new();
    if name.is_empty() {
        return Ok(found);
    }

    if name == "HEAD" {
        found.extend(refs::head(repo)?);
        return Ok(found);
    }

    if name.bytes().all(|b| b.is_ascii_hexdigit()) {
        if name.len() == OBJECT_ID_HEX_LEN {
            found.push(ObjectId::from_hex(name)?);
        } else if (MIN_ABBREV_LEN..OBJECT_ID_HEX_LEN).contains(&name.len()) {
            found.extend(repo.objects().find_by_prefix(name)?);
        }
    }

    // Names that cannot be refs never reach the filesystem.
    if validate_ref_name(name).is_ok() {
        let mut ref_names = vec![format!("refs/tags/{name}"), format!("refs/heads/{name}")];
        if name.starts_with("refs/") {
            ref_names.push(name.to_string());
        }
        for ref_name in &ref_names {
            found.extend(refs::resolve_ref(repo, ref_name)?);
        }
    }

    found.sort();
    found.dedup();
    debug!(%name, count = found.len(), "resolved name candidates");
    Ok(found)
}

/// Resolve `name` and, when `expected` is given, peel it to that kind.
///
/// A tag peels to the object it tags; a commit peels to its tree. Anything
/// else that is not already of the expected kind is a
/// [`RepoError::KindMismatch`].
pub fn find_object(
    repo: &Repository,
    name: &str,
    expected: Option<ObjectKind>,
) -> RepoResult<ObjectId> {
    let mut id = resolve_name(repo, name)?;
    let Some(expected) = expected else {
        return Ok(id);
    };

    let store = repo.objects();
    loop {
        let kind = store
            .kind_of(&id)?
            .ok_or(RepoError::ObjectNotFound(id))?;
        if kind == expected {
            return Ok(id);
        }

        let next = match kind {
            ObjectKind::Tag => match crate::read_object(repo, &id)? {
                Object::Tag(tag) => tag.object()?,
                _ => None,
            },
            ObjectKind::Commit if expected == ObjectKind::Tree => {
                match crate::read_object(repo, &id)? {
                    Object::Commit(commit) => commit.tree()?,
                    _ => None,
                }
            }
            _ => None,
        };

        match next {
            Some(next) => {
                debug!(from = %id, to = %next, "peeled object");
                id = next;
            }
            None => {
                return Err(RepoError::KindMismatch {
                    id,
                    expected,
                    actual: kind,
                })
            }
        }
    }
}
