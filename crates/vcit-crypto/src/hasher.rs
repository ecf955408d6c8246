use vcit_types::{ObjectId, ObjectKind};

/// Kind-framed SHA-1 content hasher.
///
/// Each hasher carries the object kind whose name is prepended, together with
/// the decimal payload length and a NUL byte, to every hash computation:
///
/// ```text
/// <kind> SP <len> NUL <payload>
/// ```
///
/// A blob and a commit with identical payload bytes therefore hash to
/// different identifiers.
pub struct ContentHasher {
    kind: ObjectKind,
}

impl ContentHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self::new(ObjectKind::Blob);
    /// Hasher for tree objects.
    pub const TREE: Self = Self::new(ObjectKind::Tree);
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self::new(ObjectKind::Commit);
    /// Hasher for tag objects.
    pub const TAG: Self = Self::new(ObjectKind::Tag);

    /// Create a hasher for the given kind.
    pub const fn new(kind: ObjectKind) -> Self {
        Self { kind }
    }

    /// The header that precedes `payload_len` bytes of payload.
    pub fn header(&self, payload_len: usize) -> Vec<u8> {
        format!("{} {}\0", self.kind, payload_len).into_bytes()
    }

    /// Hash a payload under this hasher's kind framing.
    pub fn hash(&self, payload: &[u8]) -> ObjectId {
        let mut hasher = sha1_smol::Sha1::new();
        hasher.update(&self.header(payload.len()));
        hasher.update(payload);
        ObjectId::from_hash(hasher.digest().bytes())
    }

    /// Verify that a payload produces the expected object ID.
    pub fn verify(&self, payload: &[u8], expected: &ObjectId) -> bool {
        self.hash(payload) == *expected
    }

    /// Raw SHA-1 without framing, for bytes that already carry a header.
    pub fn raw_hash(data: &[u8]) -> ObjectId {
        ObjectId::from_hash(sha1_smol::Sha1::from(data).digest().bytes())
    }

    /// The kind this hasher frames payloads as.
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }
}
