use vcit_types::{ObjectId, ObjectKind};

use crate::codec;
use crate::error::StoreResult;
use crate::object::Object;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. Content-addressing guarantees this:
///   the same object always produces the same ID.
/// - Writing an object that already exists is a no-op.
/// - The ID is computed from the kind and payload, never from where or when
///   the object was written.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<Object>>;

    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    fn write(&self, object: &Object) -> StoreResult<ObjectId>;

    /// Read only the kind of an object.
    ///
    /// Works for kinds whose payload cannot be decoded.
    fn kind_of(&self, id: &ObjectId) -> StoreResult<Option<ObjectKind>>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// All stored IDs whose hex form starts with `prefix`, sorted.
    fn find_by_prefix(&self, prefix: &str) -> StoreResult<Vec<ObjectId>>;

    /// Compute the ID `write` would return, without storing anything.
    fn hash(&self, object: &Object) -> StoreResult<ObjectId> {
        codec::hash_object(object)
    }

    /// Write multiple objects and return their IDs.
    ///
    /// Default implementation calls `write()` for each object.
    fn write_batch(&self, objects: &[Object]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }
}
