//! Loose object encoding.
//!
//! On-disk format (zlib-compressed as a whole):
//! ```text
//! <kind> SP <decimal payload length> NUL <payload>
//! ```
//!
//! The identifier is the SHA-1 of the uncompressed framed bytes, so it can be
//! computed without touching disk.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use vcit_crypto::ContentHasher;
use vcit_types::{ObjectId, ObjectKind};

use crate::error::{StoreError, StoreResult};
use crate::object::Object;

/// An object ready to be written: its identifier plus compressed bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedObject {
    pub id: ObjectId,
    pub compressed: Vec<u8>,
}

/// Prepend the `kind SP len NUL` header to a payload.
pub fn frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let mut framed = ContentHasher::new(kind).header(payload.len());
    framed.extend_from_slice(payload);
    framed
}

/// Compute an object's identifier without compressing or persisting it.
pub fn hash_object(object: &Object) -> StoreResult<ObjectId> {
    let payload = object.serialize()?;
    Ok(ContentHasher::new(object.kind()).hash(&payload))
}

/// Serialize, frame, hash and compress an object.
pub fn encode(object: &Object) -> StoreResult<EncodedObject> {
    let payload = object.serialize()?;
    let kind = object.kind();
    let id = ContentHasher::new(kind).hash(&payload);
    let compressed = compress(&frame(kind, &payload))?;
    Ok(EncodedObject { id, compressed })
}

/// Decompress and decode an object.
pub fn decode(compressed: &[u8]) -> StoreResult<Object> {
    parse_framed(&decompress(compressed)?)
}

/// Decompress and decode an object, checking the bytes hash to `id`.
///
/// A bad header is reported before the hash is checked, so a length
/// mismatch is always `MalformedObject` rather than `HashMismatch`.
pub fn decode_verified(id: &ObjectId, compressed: &[u8]) -> StoreResult<Object> {
    let raw = decompress(compressed)?;
    let (kind, payload) = parse_header(&raw)?;
    let computed = ContentHasher::raw_hash(&raw);
    if computed != *id {
        return Err(StoreError::HashMismatch { id: *id, computed });
    }
    Object::deserialize(kind, payload)
}

/// Decode uncompressed framed bytes.
pub fn parse_framed(raw: &[u8]) -> StoreResult<Object> {
    let (kind, payload) = parse_header(raw)?;
    Object::deserialize(kind, payload)
}

/// Decompress an object and return only its kind.
///
/// The header is validated exactly as [`decode`] does, but the payload is not
/// deserialized, so this works for every kind.
pub fn peek_kind(compressed: &[u8]) -> StoreResult<ObjectKind> {
    let raw = decompress(compressed)?;
    let (kind, _) = parse_header(&raw)?;
    Ok(kind)
}

/// Split framed bytes into kind and payload.
///
/// The declared length must equal the number of bytes after the NUL.
pub fn parse_header(raw: &[u8]) -> StoreResult<(ObjectKind, &[u8])> {
    let spc = raw
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| malformed("missing space after object kind".into()))?;
    let nul = raw[spc..]
        .iter()
        .position(|&b| b == 0)
        .map(|i| i + spc)
        .ok_or_else(|| malformed("missing NUL after object length".into()))?;

    let len_field = &raw[spc + 1..nul];
    let declared = parse_len(len_field).ok_or_else(|| {
        malformed(format!(
            "invalid length field {:?}",
            String::from_utf8_lossy(len_field)
        ))
    })?;

    let payload = &raw[nul + 1..];
    if payload.len() != declared {
        return Err(malformed(format!(
            "declared length {declared}, found {} bytes",
            payload.len()
        )));
    }

    let kind = ObjectKind::from_bytes(&raw[..spc])?;
    Ok((kind, payload))
}

/// zlib-compress bytes at the default level.
pub fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Inflate zlib-compressed bytes.
pub fn decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

fn parse_len(field: &[u8]) -> Option<usize> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(field).ok()?.parse().ok()
}

fn malformed(reason: String) -> StoreError {
    StoreError::MalformedObject { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Blob, Commit, Tree};

    fn blob(data: &[u8]) -> Object {
        Object::Blob(Blob::new(data.to_vec()))
    }

    fn compressed(raw: &[u8]) -> Vec<u8> {
        compress(raw).unwrap()
    }

    #[test]
    fn frame_prepends_header() {
        assert_eq!(frame(ObjectKind::Blob, b"abc"), b"blob 3\0abc".to_vec());
        assert_eq!(frame(ObjectKind::Commit, b""), b"commit 0\0".to_vec());
    }

    #[test]
    fn encode_decode_roundtrip() {
        let object = blob(b"hello world\n");
        let encoded = encode(&object).unwrap();
        assert_eq!(
            encoded.id.to_hex(),
            "3b18e512dba79e4c8300dd08aeb37f8e728b8dad"
        );
        assert_eq!(decode(&encoded.compressed).unwrap(), object);
        assert_eq!(
            decode_verified(&encoded.id, &encoded.compressed).unwrap(),
            object
        );
    }

    #[test]
    fn commit_roundtrip_is_byte_exact() {
        let raw = b"tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147\nauthor a\n\nmsg\n";
        let object = Object::Commit(Commit::deserialize(raw).unwrap());
        let encoded = encode(&object).unwrap();
        let decoded = decode(&encoded.compressed).unwrap();
        assert_eq!(decoded.serialize().unwrap(), raw.to_vec());
        assert_eq!(hash_object(&decoded).unwrap(), encoded.id);
    }

    #[test]
    fn hash_matches_encode() {
        let object = blob(b"dry run");
        assert_eq!(hash_object(&object).unwrap(), encode(&object).unwrap().id);
    }

    #[test]
    fn tree_cannot_be_encoded() {
        let err = encode(&Object::Tree(Tree)).unwrap_err();
        assert!(matches!(err, StoreError::Unimplemented(_)));
    }

    #[test]
    fn length_one_too_many_is_malformed() {
        let err = decode(&compressed(b"blob 5\0abcdef")).unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject { .. }));
    }

    #[test]
    fn length_one_too_few_is_malformed() {
        let err = decode(&compressed(b"blob 5\0abcd")).unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject { .. }));
    }

    #[test]
    fn missing_nul_is_malformed() {
        let err = decode(&compressed(b"blob 5abcde")).unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject { .. }));
    }

    #[test]
    fn non_numeric_length_is_malformed() {
        for raw in [&b"blob \0"[..], b"blob -1\0", b"blob 1x\0a"] {
            let err = decode(&compressed(raw)).unwrap_err();
            assert!(matches!(err, StoreError::MalformedObject { .. }), "{raw:?}");
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = decode(&compressed(b"snapshot 3\0abc")).unwrap_err();
        match err {
            StoreError::UnknownObjectKind(name) => assert_eq!(name, "snapshot"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn peek_kind_reads_only_the_header() {
        let tree = compressed(b"tree 9\0100644 a\0");
        assert_eq!(peek_kind(&tree).unwrap(), ObjectKind::Tree);
        assert!(matches!(
            decode(&tree).unwrap_err(),
            StoreError::Unimplemented(_)
        ));
        assert!(matches!(
            peek_kind(&compressed(b"tree 10\0100644 a\0")).unwrap_err(),
            StoreError::MalformedObject { .. }
        ));
    }

    #[test]
    fn garbage_is_an_io_error() {
        let err = decode(b"definitely not zlib").unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn verified_decode_detects_wrong_id() {
        let encoded = encode(&blob(b"content")).unwrap();
        let other = hash_object(&blob(b"other")).unwrap();
        let err = decode_verified(&other, &encoded.compressed).unwrap_err();
        assert!(matches!(err, StoreError::HashMismatch { .. }));
    }

    #[test]
    fn verified_decode_reports_bad_header_first() {
        let id = hash_object(&blob(b"hello")).unwrap();
        for raw in [&b"blob 6\0hello"[..], b"blob 4\0hello"] {
            let err = decode_verified(&id, &compressed(raw)).unwrap_err();
            assert!(matches!(err, StoreError::MalformedObject { .. }), "{raw:?}");
        }
        let err = decode_verified(&id, &compressed(b"snapshot 5\0hello")).unwrap_err();
        assert!(matches!(err, StoreError::UnknownObjectKind(_)));
    }
}
