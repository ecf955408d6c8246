//! Repository handle: control directory discovery, path resolution and
//! initialization.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use vcit_store::LooseObjectStore;

use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};

/// Name of the control directory inside a worktree.
pub const CONTROL_DIR: &str = ".vcit";

const DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";
const DEFAULT_HEAD: &str = "ref: refs/heads/master\n";

/// An opened repository.
///
/// Read-only once constructed. Paths inside the control directory are
/// addressed as segment lists, e.g. `&["refs", "heads", "master"]`.
#[derive(Clone, Debug)]
pub struct Repository {
    worktree: PathBuf,
    control_dir: PathBuf,
    config: RepoConfig,
}

impl Repository {
    /// Open the repository whose worktree is `worktree`.
    ///
    /// With `force`, a missing control directory or config is tolerated and
    /// the format version is not checked. Only `init` should need that.
    pub fn open(worktree: impl Into<PathBuf>, force: bool) -> RepoResult<Self> {
        let worktree = worktree.into();
        let control_dir = worktree.join(CONTROL_DIR);

        if !force && !control_dir.is_dir() {
            return Err(RepoError::NotARepository { path: worktree });
        }

        let config_path = control_dir.join("config");
        let config = if force && !config_path.exists() {
            RepoConfig::default()
        } else {
            RepoConfig::load(&config_path)?
        };
        if !force {
            config.validate()?;
        }

        Ok(Self {
            worktree,
            control_dir,
            config,
        })
    }

    /// Walk upward from `start` to the first directory holding a control
    /// directory, and open it.
    ///
    /// Returns `Ok(None)` when nothing is found and `required` is false.
    /// A `start` that does not exist is walked as an absolute path.
    pub fn find_root(start: impl AsRef<Path>, required: bool) -> RepoResult<Option<Self>> {
        let start = start.as_ref();
        let start = match start.canonicalize() {
            Ok(path) => path,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => std::path::absolute(start)?,
            Err(e) => return Err(e.into()),
        };
        for dir in start.ancestors() {
            if dir.join(CONTROL_DIR).is_dir() {
                debug!(root = %dir.display(), "found repository");
                return Self::open(dir, false).map(Some);
            }
        }
        if required {
            Err(RepoError::NotARepository { path: start })
        } else {
            Ok(None)
        }
    }

    /// Create a new repository at `path`.
    ///
    /// The path must not exist or must be an empty directory.
    pub fn init(path: impl Into<PathBuf>) -> RepoResult<Self> {
        let worktree = path.into();
        if worktree.exists() {
            if !worktree.is_dir() {
                return Err(RepoError::NotADirectory { path: worktree });
            }
            if fs::read_dir(&worktree)?.next().is_some() {
                return Err(RepoError::NotEmpty { path: worktree });
            }
        } else {
            fs::create_dir_all(&worktree)?;
        }

        let repo = Self::open(worktree, true)?;
        for segments in [
            &["branches"][..],
            &["objects"],
            &["refs", "tags"],
            &["refs", "heads"],
        ] {
            repo.ensure_dir(segments, true)?;
        }
        repo.write_control_file("description", DESCRIPTION)?;
        repo.write_control_file("HEAD", DEFAULT_HEAD)?;
        repo.config.save(&repo.resolve(&["config"]))?;

        info!(path = %repo.worktree.display(), "initialized empty repository");
        Ok(repo)
    }

    /// Join the control directory with `segments`. Touches nothing on disk.
    pub fn resolve(&self, segments: &[&str]) -> PathBuf {
        segments
            .iter()
            .fold(self.control_dir.clone(), |path, segment| path.join(segment))
    }

    /// The directory named by `segments`, created if `create` is set.
    ///
    /// Returns `Ok(None)` if it is absent and `create` is false.
    pub fn ensure_dir(&self, segments: &[&str], create: bool) -> RepoResult<Option<PathBuf>> {
        let path = self.resolve(segments);
        if path.exists() {
            if path.is_dir() {
                Ok(Some(path))
            } else {
                Err(RepoError::NotADirectory { path })
            }
        } else if create {
            fs::create_dir_all(&path)?;
            debug!(path = %path.display(), "created directory");
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }

    /// The file named by `segments`, once its parent directory is
    /// available. The file itself is never created.
    pub fn ensure_file(&self, segments: &[&str], create: bool) -> RepoResult<Option<PathBuf>> {
        let Some((_, parent)) = segments.split_last() else {
            return Ok(Some(self.control_dir.clone()));
        };
        Ok(self
            .ensure_dir(parent, create)?
            .map(|_| self.resolve(segments)))
    }

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    pub fn control_dir(&self) -> &Path {
        &self.control_dir
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// The loose object store under `objects/`.
    pub fn objects(&self) -> LooseObjectStore {
        LooseObjectStore::new(self.resolve(&["objects"]))
    }

    fn write_control_file(&self, name: &str, contents: &str) -> RepoResult<()> {
        if let Some(path) = self.ensure_file(&[name], true)? {
            fs::write(path, contents)?;
        }
        Ok(())
    }
}
