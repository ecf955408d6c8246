use vcit_types::{ObjectId, ObjectKind};

use crate::error::{StoreError, StoreResult};
use crate::kvlm::Kvlm;

/// A typed object: one of the closed set of kinds the store understands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    /// The kind tag written into the object header.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// Encode the payload (the bytes after the header).
    pub fn serialize(&self) -> StoreResult<Vec<u8>> {
        match self {
            Self::Blob(blob) => Ok(blob.serialize()),
            Self::Tree(tree) => tree.serialize(),
            Self::Commit(commit) => Ok(commit.serialize()),
            Self::Tag(tag) => Ok(tag.serialize()),
        }
    }

    /// Decode a payload as an object of the given kind.
    pub fn deserialize(kind: ObjectKind, data: &[u8]) -> StoreResult<Self> {
        Ok(match kind {
            ObjectKind::Blob => Self::Blob(Blob::deserialize(data)),
            ObjectKind::Tree => Self::Tree(Tree::deserialize(data)?),
            ObjectKind::Commit => Self::Commit(Commit::deserialize(data)?),
            ObjectKind::Tag => Self::Tag(Tag::deserialize(data)?),
        })
    }
}

impl From<Blob> for Object {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob)
    }
}

impl From<Commit> for Object {
    fn from(commit: Commit) -> Self {
        Self::Commit(commit)
    }
}

impl From<Tag> for Object {
    fn from(tag: Tag) -> Self {
        Self::Tag(tag)
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object. The payload has no further structure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn deserialize(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// Directory listing object.
///
/// Only the kind is known to the store; entry encoding is not implemented
/// and every (de)serialization attempt fails with
/// [`StoreError::Unimplemented`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree;

impl Tree {
    pub fn serialize(&self) -> StoreResult<Vec<u8>> {
        Err(StoreError::Unimplemented("tree serialization"))
    }

    pub fn deserialize(_data: &[u8]) -> StoreResult<Self> {
        Err(StoreError::Unimplemented("tree deserialization"))
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Snapshot metadata record, stored as a KVLM payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    pub kvlm: Kvlm,
}

impl Commit {
    pub fn new(kvlm: Kvlm) -> Self {
        Self { kvlm }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.kvlm.serialize()
    }

    pub fn deserialize(data: &[u8]) -> StoreResult<Self> {
        Ok(Self {
            kvlm: Kvlm::parse(data)?,
        })
    }

    /// The root tree this commit records.
    pub fn tree(&self) -> StoreResult<Option<ObjectId>> {
        parse_id(self.kvlm.get_first(b"tree"))
    }

    /// Parent commits, in record order.
    pub fn parents(&self) -> StoreResult<Vec<ObjectId>> {
        self.kvlm
            .get_all(b"parent")
            .iter()
            .map(|raw| parse_hex(raw))
            .collect()
    }

    pub fn author(&self) -> Option<&[u8]> {
        self.kvlm.get_first(b"author")
    }

    pub fn committer(&self) -> Option<&[u8]> {
        self.kvlm.get_first(b"committer")
    }

    pub fn message(&self) -> &[u8] {
        self.kvlm.message()
    }
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// Annotated tag record. Same payload format as [`Commit`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tag {
    pub kvlm: Kvlm,
}

impl Tag {
    pub fn new(kvlm: Kvlm) -> Self {
        Self { kvlm }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.kvlm.serialize()
    }

    pub fn deserialize(data: &[u8]) -> StoreResult<Self> {
        Ok(Self {
            kvlm: Kvlm::parse(data)?,
        })
    }

    /// The tagged object.
    pub fn object(&self) -> StoreResult<Option<ObjectId>> {
        parse_id(self.kvlm.get_first(b"object"))
    }

    /// The declared kind of the tagged object.
    pub fn target_kind(&self) -> StoreResult<Option<ObjectKind>> {
        self.kvlm
            .get_first(b"type")
            .map(|raw| ObjectKind::from_bytes(raw).map_err(StoreError::from))
            .transpose()
    }

    /// The tag name.
    pub fn name(&self) -> Option<&[u8]> {
        self.kvlm.get_first(b"tag")
    }

    pub fn tagger(&self) -> Option<&[u8]> {
        self.kvlm.get_first(b"tagger")
    }

    pub fn message(&self) -> &[u8] {
        self.kvlm.message()
    }
}

fn parse_id(raw: Option<&[u8]>) -> StoreResult<Option<ObjectId>> {
    raw.map(parse_hex).transpose()
}

fn parse_hex(raw: &[u8]) -> StoreResult<ObjectId> {
    let hex = std::str::from_utf8(raw).map_err(|e| StoreError::MalformedObject {
        reason: format!("object reference is not UTF-8: {e}"),
    })?;
    Ok(ObjectId::from_hex(hex)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = "29ff16c9c14e2652b22f8b78bb08a5a07930c147";
    const PARENT1: &str = "206941306e8a8af65b66eaaaea388a7ae24d49a0";
    const PARENT2: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";

    fn merge_commit_bytes() -> Vec<u8> {
        format!(
            "tree {TREE}\nparent {PARENT1}\nparent {PARENT2}\n\
author A <a@example.com> 1527025023 +0200\n\
committer C <c@example.com> 1527025044 +0200\n\nMerge branch 'dev'\n"
        )
        .into_bytes()
    }

    #[test]
    fn blob_roundtrip_is_identity() {
        let blob = Blob::new(b"\x00binary\xffdata".to_vec());
        let data = blob.serialize();
        assert_eq!(data, b"\x00binary\xffdata");
        assert_eq!(Blob::deserialize(&data), blob);
    }

    #[test]
    fn empty_objects_are_ready_to_populate() {
        assert!(Blob::default().data.is_empty());

        let mut commit = Commit::default();
        commit.kvlm.push("tree", TREE).unwrap();
        commit.kvlm.set_message("first\n");
        let bytes = commit.serialize();
        assert_eq!(bytes, format!("tree {TREE}\n\nfirst\n").into_bytes());
    }

    #[test]
    fn tree_is_unimplemented() {
        assert!(matches!(
            Tree.serialize(),
            Err(StoreError::Unimplemented(_))
        ));
        assert!(matches!(
            Object::deserialize(ObjectKind::Tree, b"100644 a\0"),
            Err(StoreError::Unimplemented(_))
        ));
    }

    #[test]
    fn commit_accessors() {
        let commit = Commit::deserialize(&merge_commit_bytes()).unwrap();
        assert_eq!(commit.tree().unwrap().unwrap().to_hex(), TREE);
        let parents: Vec<String> = commit
            .parents()
            .unwrap()
            .iter()
            .map(ObjectId::to_hex)
            .collect();
        assert_eq!(parents, vec![PARENT1, PARENT2]);
        assert_eq!(commit.author(), Some(&b"A <a@example.com> 1527025023 +0200"[..]));
        assert_eq!(commit.committer(), Some(&b"C <c@example.com> 1527025044 +0200"[..]));
        assert_eq!(commit.message(), b"Merge branch 'dev'\n");
        assert_eq!(commit.serialize(), merge_commit_bytes());
    }

    #[test]
    fn commit_with_bad_parent_reports_error() {
        let commit = Commit::deserialize(b"parent nothex\n\nm").unwrap();
        assert!(commit.parents().is_err());
    }

    #[test]
    fn malformed_commit_does_not_produce_partial_object() {
        let err = Object::deserialize(ObjectKind::Commit, b"tree abc").unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord { .. }));
    }

    #[test]
    fn tag_accessors() {
        let raw = format!(
            "object {PARENT1}\ntype commit\ntag v1.0\ntagger T <t@example.com> 0 +0000\n\nrelease\n"
        );
        let tag = Tag::deserialize(raw.as_bytes()).unwrap();
        assert_eq!(tag.object().unwrap().unwrap().to_hex(), PARENT1);
        assert_eq!(tag.target_kind().unwrap(), Some(ObjectKind::Commit));
        assert_eq!(tag.name(), Some(&b"v1.0"[..]));
        assert_eq!(tag.tagger(), Some(&b"T <t@example.com> 0 +0000"[..]));
        assert_eq!(tag.message(), b"release\n");
    }

    #[test]
    fn object_kind_dispatch() {
        let blob = Object::deserialize(ObjectKind::Blob, b"x").unwrap();
        assert_eq!(blob.kind(), ObjectKind::Blob);

        let commit = Object::deserialize(ObjectKind::Commit, &merge_commit_bytes()).unwrap();
        assert_eq!(commit.kind(), ObjectKind::Commit);
        assert_eq!(commit.serialize().unwrap(), merge_commit_bytes());

        let tag = Object::deserialize(ObjectKind::Tag, b"tag t\n\n").unwrap();
        assert_eq!(tag.kind(), ObjectKind::Tag);
    }
}
