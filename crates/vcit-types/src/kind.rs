use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of object stored.
///
/// The set is closed: the kind name doubles as the on-disk header tag and as
/// the dispatch key when an object is decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Raw content (file contents, arbitrary data).
    Blob,
    /// Directory listing.
    Tree,
    /// Snapshot metadata record.
    Commit,
    /// Annotated tag record.
    Tag,
}

impl ObjectKind {
    /// All kinds, in header-name order.
    pub const ALL: [ObjectKind; 4] = [Self::Blob, Self::Tree, Self::Commit, Self::Tag];

    /// The ASCII name written into object headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }

    /// Look a kind up by its raw header name.
    pub fn from_bytes(name: &[u8]) -> Result<Self, TypeError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().as_bytes() == name)
            .ok_or_else(|| TypeError::UnknownObjectKind(String::from_utf8_lossy(name).into_owned()))
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_header_names() {
        assert_eq!(format!("{}", ObjectKind::Blob), "blob");
        assert_eq!(format!("{}", ObjectKind::Tree), "tree");
        assert_eq!(format!("{}", ObjectKind::Commit), "commit");
        assert_eq!(format!("{}", ObjectKind::Tag), "tag");
    }

    #[test]
    fn parse_known_names() {
        for kind in ObjectKind::ALL {
            assert_eq!(kind.as_str().parse::<ObjectKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(
            "Blob".parse::<ObjectKind>(),
            Err(TypeError::UnknownObjectKind("Blob".into()))
        );
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = ObjectKind::from_bytes(b"snapshot").unwrap_err();
        assert_eq!(err, TypeError::UnknownObjectKind("snapshot".into()));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ObjectKind::Commit).unwrap();
        assert_eq!(json, "\"commit\"");
    }
}
