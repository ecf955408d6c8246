use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use vcit_types::{ObjectId, ObjectKind};

use crate::codec;
use crate::error::StoreResult;
use crate::object::Object;
use crate::traits::ObjectStore;

/// Filesystem store holding one compressed file per object.
///
/// Layout under the objects directory:
/// ```text
/// <2 hex chars>/<38 hex chars>
/// ```
/// The two-character fan-out directory bounds the number of entries per
/// directory.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    root: PathBuf,
}

impl LooseObjectStore {
    /// Open a store rooted at an `objects` directory.
    ///
    /// The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The objects directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the object with this ID lives (whether or not it exists).
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (dir, file) = id.fan_out();
        self.root.join(dir).join(file)
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<Object>> {
        let path = self.object_path(id);
        if !path.is_file() {
            return Ok(None);
        }
        let compressed = fs::read(&path)?;
        let object = codec::decode_verified(id, &compressed)?;
        debug!(id = %id, kind = %object.kind(), "read loose object");
        Ok(Some(object))
    }

    fn kind_of(&self, id: &ObjectId) -> StoreResult<Option<ObjectKind>> {
        let path = self.object_path(id);
        if !path.is_file() {
            return Ok(None);
        }
        let compressed = fs::read(&path)?;
        codec::peek_kind(&compressed).map(Some)
    }

    fn write(&self, object: &Object) -> StoreResult<ObjectId> {
        let encoded = codec::encode(object)?;
        let (dir_name, file_name) = encoded.id.fan_out();
        let dir = self.root.join(dir_name);
        let path = dir.join(file_name);

        // Same ID means same bytes: an existing file is already correct.
        if path.is_file() {
            debug!(id = %encoded.id, "loose object already present");
            return Ok(encoded.id);
        }

        fs::create_dir_all(&dir)?;

        // Temp file + rename: readers never see a partially written object.
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&encoded.compressed)?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(
            id = %encoded.id,
            kind = %object.kind(),
            bytes = encoded.compressed.len(),
            "wrote loose object"
        );
        Ok(encoded.id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }

    /// Prefixes shorter than the fan-out directory, or containing non-hex
    /// characters, match nothing.
    fn find_by_prefix(&self, prefix: &str) -> StoreResult<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        if prefix.len() < 2 || !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Ok(Vec::new());
        }

        let dir_name = &prefix[..2];
        let dir = self.root.join(dir_name);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                warn!(dir = %dir.display(), "skipping non UTF-8 entry in objects directory");
                continue;
            };
            // Leftover temp files from interrupted writes.
            if file_name.starts_with('.') {
                continue;
            }
            let hex = format!("{dir_name}{file_name}");
            match ObjectId::from_hex(&hex) {
                Ok(id) if id.matches_prefix(&prefix) => ids.push(id),
                Ok(_) => {}
                Err(e) => warn!(path = %entry.path().display(), error = %e, "skipping stray file in objects directory"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}
