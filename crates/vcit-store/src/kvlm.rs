//! Key-value-list-with-message records.
//!
//! Commit and tag payloads are a block of `key SP value LF` header lines,
//! a blank line, and a free-text message:
//!
//! ```text
//! tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147
//! parent 206941306e8a8af65b66eaaaea388a7ae24d49a0
//! author Ada Lovelace <ada@example.com> 1527025023 +0200
//! gpgsig -----BEGIN PGP SIGNATURE-----
//!
//!  iQIzBAABCAAdFiEExwXquOM8bWb4Q2zVGxM2FxoLkGQFAlsEjZQACgkQGxM2FxoL
//!  -----END PGP SIGNATURE-----
//!
//! Create first draft
//! ```
//!
//! Values spanning several lines are folded: every continuation line starts
//! with a single space, removed on parse and re-inserted on serialize.
//! Parsing then serializing a well-formed record reproduces it byte for
//! byte, which keeps object identifiers stable.

use crate::error::{StoreError, StoreResult};

/// The value slot of a record key.
///
/// Most keys appear once; keys such as `parent` repeat on merge commits and
/// keep every occurrence in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KvlmValue {
    /// The key appeared once.
    Scalar(Vec<u8>),
    /// The key appeared several times, in record order.
    Multi(Vec<Vec<u8>>),
}

impl KvlmValue {
    /// Every value, in record order. A scalar is a one-element slice.
    pub fn values(&self) -> &[Vec<u8>] {
        match self {
            Self::Scalar(value) => std::slice::from_ref(value),
            Self::Multi(values) => values,
        }
    }

    /// The first value recorded for the key.
    pub fn first(&self) -> &[u8] {
        match self {
            Self::Scalar(value) => value,
            Self::Multi(values) => values.first().map(Vec::as_slice).unwrap_or_default(),
        }
    }

    fn push(&mut self, value: Vec<u8>) {
        match self {
            Self::Scalar(existing) => {
                let existing = std::mem::take(existing);
                *self = Self::Multi(vec![existing, value]);
            }
            Self::Multi(values) => values.push(value),
        }
    }
}

/// An ordered record of header fields plus a trailing message.
///
/// Field order is insertion order of distinct keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Kvlm {
    fields: Vec<(Vec<u8>, KvlmValue)>,
    message: Vec<u8>,
}

impl Kvlm {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw record.
    ///
    /// Fails with [`StoreError::MalformedRecord`] when a header line has no
    /// terminating newline, when a key is empty, or when the header block is
    /// not followed by a blank line.
    pub fn parse(raw: &[u8]) -> StoreResult<Self> {
        let mut kvlm = Self::new();
        let mut start = 0;

        loop {
            let spc = find(raw, start, b' ');
            let nl = find(raw, start, b'\n');

            let (spc, nl) = match (spc, nl) {
                (Some(spc), Some(nl)) if spc < nl => (spc, nl),
                (_, nl) => {
                    if nl != Some(start) {
                        return Err(malformed(start, "expected blank line before message"));
                    }
                    kvlm.message = raw[start + 1..].to_vec();
                    return Ok(kvlm);
                }
            };

            if spc == start {
                return Err(malformed(start, "empty key"));
            }

            let mut end = nl;
            while raw.get(end + 1) == Some(&b' ') {
                end = find(raw, end + 1, b'\n')
                    .ok_or_else(|| malformed(end + 1, "unterminated continuation line"))?;
            }

            let key = raw[start..spc].to_vec();
            let value = unfold(&raw[spc + 1..end]);
            kvlm.push_unchecked(key, value);

            start = end + 1;
        }
    }

    /// Serialize the record.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();

        for (key, value) in &self.fields {
            for v in value.values() {
                out.extend_from_slice(key);
                out.push(b' ');
                fold_into(&mut out, v);
                out.push(b'\n');
            }
        }

        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }

    /// Add a value for `key`, keeping any earlier values.
    ///
    /// Fails with [`StoreError::InvalidKey`] if the key is empty or contains
    /// a space or newline.
    pub fn push(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> StoreResult<()> {
        let key = checked_key(key.into())?;
        self.push_unchecked(key, value.into());
        Ok(())
    }

    /// Replace every value for `key` with a single value.
    ///
    /// A new key is appended after the existing ones. Keys are checked as in
    /// [`Kvlm::push`].
    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> StoreResult<()> {
        let key = checked_key(key.into())?;
        let value = KvlmValue::Scalar(value.into());
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
        Ok(())
    }

    fn push_unchecked(&mut self, key: Vec<u8>, value: Vec<u8>) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => slot.push(value),
            None => self.fields.push((key, KvlmValue::Scalar(value))),
        }
    }

    /// The value slot for `key`.
    pub fn get(&self, key: &[u8]) -> Option<&KvlmValue> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_slice() == key)
            .map(|(_, value)| value)
    }

    /// The first value for `key`.
    pub fn get_first(&self, key: &[u8]) -> Option<&[u8]> {
        self.get(key).map(KvlmValue::first)
    }

    /// All values for `key`; empty when the key is absent.
    pub fn get_all(&self, key: &[u8]) -> &[Vec<u8>] {
        self.get(key).map(KvlmValue::values).unwrap_or_default()
    }

    /// Keys in record order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.fields.iter().map(|(k, _)| k.as_slice())
    }

    /// Fields in record order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &KvlmValue)> {
        self.fields.iter().map(|(k, v)| (k.as_slice(), v))
    }

    /// The free-text message.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Replace the free-text message.
    pub fn set_message(&mut self, message: impl Into<Vec<u8>>) {
        self.message = message.into();
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no header fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn find(raw: &[u8], from: usize, needle: u8) -> Option<usize> {
    raw.get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| i + from)
}

fn checked_key(key: Vec<u8>) -> StoreResult<Vec<u8>> {
    if key.is_empty() || key.iter().any(|&b| b == b' ' || b == b'\n') {
        return Err(StoreError::InvalidKey(String::from_utf8_lossy(&key).into_owned()));
    }
    Ok(key)
}

fn malformed(offset: usize, reason: &str) -> StoreError {
    StoreError::MalformedRecord {
        offset,
        reason: reason.to_string(),
    }
}

/// `"\n "` -> `"\n"`
fn unfold(folded: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(folded.len());
    let mut bytes = folded.iter().copied().peekable();
    while let Some(b) = bytes.next() {
        out.push(b);
        if b == b'\n' && bytes.peek() == Some(&b' ') {
            bytes.next();
        }
    }
    out
}

/// `"\n"` -> `"\n "`
fn fold_into(out: &mut Vec<u8>, value: &[u8]) {
    for &b in value {
        out.push(b);
        if b == b'\n' {
            out.push(b' ');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const COMMIT: &[u8] = b"tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147\n\
parent 206941306e8a8af65b66eaaaea388a7ae24d49a0\n\
author Ada Lovelace <ada@example.com> 1527025023 +0200\n\
committer Ada Lovelace <ada@example.com> 1527025044 +0200\n\
gpgsig -----BEGIN PGP SIGNATURE-----\n \n iQIzBAABCAAdFiEExwXquOM8bWb4Q2zVGxM2FxoLkGQFAlsEjZQACgkQGxM2FxoL\n -----END PGP SIGNATURE-----\n\
\n\
Create first draft";

    fn roundtrip(raw: &[u8]) -> Kvlm {
        let kvlm = Kvlm::parse(raw).unwrap();
        assert_eq!(kvlm.serialize(), raw);
        kvlm
    }

    // -----------------------------------------------------------------------
    // Round trips
    // -----------------------------------------------------------------------

    #[test]
    fn message_only() {
        let kvlm = roundtrip(b"\njust a message\nwith two lines\n");
        assert!(kvlm.is_empty());
        assert_eq!(kvlm.message(), b"just a message\nwith two lines\n");
    }

    #[test]
    fn empty_message() {
        let kvlm = roundtrip(b"tree abc\n\n");
        assert_eq!(kvlm.get_first(b"tree"), Some(&b"abc"[..]));
        assert!(kvlm.message().is_empty());
    }

    #[test]
    fn one_key_one_value() {
        let kvlm = roundtrip(b"tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147\n\nmsg");
        assert_eq!(kvlm.len(), 1);
        assert_eq!(
            kvlm.get(b"tree"),
            Some(&KvlmValue::Scalar(
                b"29ff16c9c14e2652b22f8b78bb08a5a07930c147".to_vec()
            ))
        );
        assert_eq!(kvlm.message(), b"msg");
    }

    #[test]
    fn folded_value_is_unfolded() {
        let kvlm = roundtrip(COMMIT);
        let sig = kvlm.get_first(b"gpgsig").unwrap();
        assert_eq!(
            sig,
            &b"-----BEGIN PGP SIGNATURE-----\n\niQIzBAABCAAdFiEExwXquOM8bWb4Q2zVGxM2FxoLkGQFAlsEjZQACgkQGxM2FxoL\n-----END PGP SIGNATURE-----"[..]
        );
        assert_eq!(kvlm.message(), b"Create first draft");
    }

    #[test]
    fn key_order_is_preserved() {
        let kvlm = roundtrip(COMMIT);
        let keys: Vec<&[u8]> = kvlm.keys().collect();
        assert_eq!(
            keys,
            vec![
                &b"tree"[..],
                &b"parent"[..],
                &b"author"[..],
                &b"committer"[..],
                &b"gpgsig"[..]
            ]
        );
    }

    #[test]
    fn repeated_key_becomes_ordered_list() {
        let raw = b"tree t\nparent p1\nparent p2\nparent p3\nauthor a\n\nmerge";
        let kvlm = roundtrip(raw);
        assert_eq!(
            kvlm.get(b"parent"),
            Some(&KvlmValue::Multi(vec![
                b"p1".to_vec(),
                b"p2".to_vec(),
                b"p3".to_vec()
            ]))
        );
        assert_eq!(kvlm.get_first(b"parent"), Some(&b"p1"[..]));
        assert_eq!(kvlm.len(), 3);
    }

    #[test]
    fn value_may_contain_spaces_and_be_empty() {
        let kvlm = roundtrip(b"author A U Thor <a@b> 0 +0000\nencoding \n\nm");
        assert_eq!(kvlm.get_first(b"author"), Some(&b"A U Thor <a@b> 0 +0000"[..]));
        assert_eq!(kvlm.get_first(b"encoding"), Some(&b""[..]));
    }

    // -----------------------------------------------------------------------
    // Building records
    // -----------------------------------------------------------------------

    #[test]
    fn push_accumulates_and_set_replaces() {
        let mut kvlm = Kvlm::new();
        kvlm.push("tree", "t").unwrap();
        kvlm.push("parent", "p1").unwrap();
        kvlm.push("parent", "p2").unwrap();
        assert_eq!(kvlm.get_all(b"parent"), &[b"p1".to_vec(), b"p2".to_vec()]);

        kvlm.set("parent", "only").unwrap();
        assert_eq!(kvlm.get(b"parent"), Some(&KvlmValue::Scalar(b"only".to_vec())));
        assert!(kvlm.get_all(b"missing").is_empty());
    }

    #[test]
    fn serialize_folds_multiline_values() {
        let mut kvlm = Kvlm::new();
        kvlm.push("gpgsig", "line one\nline two").unwrap();
        kvlm.set_message("body\n");
        assert_eq!(kvlm.serialize(), b"gpgsig line one\n line two\n\nbody\n".to_vec());
    }

    #[test]
    fn keys_that_cannot_be_serialized_are_rejected() {
        let mut kvlm = Kvlm::new();
        for key in ["", "two words", "line\nbreak"] {
            assert!(matches!(
                kvlm.push(key, "v").unwrap_err(),
                StoreError::InvalidKey(_)
            ));
            assert!(matches!(
                kvlm.set(key, "v").unwrap_err(),
                StoreError::InvalidKey(_)
            ));
        }
        assert!(kvlm.is_empty());

        kvlm.push("tree", "t").unwrap();
        assert_eq!(kvlm.serialize(), b"tree t\n\n".to_vec());
    }

    // -----------------------------------------------------------------------
    // Malformed input
    // -----------------------------------------------------------------------

    #[test]
    fn missing_blank_line_is_rejected() {
        let err = Kvlm::parse(b"no separator here").unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord { offset: 0, .. }));
    }

    #[test]
    fn header_without_message_separator_is_rejected() {
        let err = Kvlm::parse(b"tree abc\n").unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord { offset: 9, .. }));
    }

    #[test]
    fn header_without_newline_is_rejected() {
        let err = Kvlm::parse(b"tree abc").unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord { .. }));
    }

    #[test]
    fn unterminated_continuation_is_rejected() {
        let err = Kvlm::parse(b"gpgsig a\n b").unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord { .. }));
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = Kvlm::parse(b" value\n\nmsg").unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord { offset: 0, .. }));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(Kvlm::parse(b"").is_err());
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn arb_kvlm() -> impl Strategy<Value = Kvlm> {
        let field = (
            "[a-z][a-z0-9-]{0,7}",
            proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..24), 1..3),
        );
        (
            proptest::collection::vec(field, 0..6),
            proptest::collection::vec(any::<u8>(), 0..64),
        )
            .prop_map(|(fields, message)| {
                let mut kvlm = Kvlm::new();
                for (key, values) in fields {
                    for value in values {
                        kvlm.push(key.clone(), value).unwrap();
                    }
                }
                kvlm.set_message(message);
                kvlm
            })
    }

    proptest! {
        #[test]
        fn parse_inverts_serialize(kvlm in arb_kvlm()) {
            let raw = kvlm.serialize();
            let parsed = Kvlm::parse(&raw).unwrap();
            prop_assert_eq!(&parsed, &kvlm);
            prop_assert_eq!(parsed.serialize(), raw);
        }
    }
}
