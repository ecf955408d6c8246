//! Content-addressed object storage for vcit.
//!
//! This crate implements a hash-keyed object store analogous to git's
//! `.git/objects/` directory. Every object is
//! stored as an immutable, zlib-compressed loose file identified by the
//! SHA-1 of its framed bytes.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, arbitrary data)
//! - [`Tree`] -- directory listing (kind only; encoding not implemented)
//! - [`Commit`] -- snapshot metadata as a [`Kvlm`] record
//! - [`Tag`] -- annotated tag as a [`Kvlm`] record
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- one compressed file per object under `objects/`
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. The ID is computed before any byte touches disk; hashing alone is a
//!    valid dry run.
//! 3. Decoding validates the declared payload length and the content hash.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod codec;
pub mod error;
pub mod kvlm;
pub mod loose;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use codec::EncodedObject;
pub use error::{StoreError, StoreResult};
pub use kvlm::{Kvlm, KvlmValue};
pub use loose::LooseObjectStore;
pub use object::{Blob, Commit, Object, Tag, Tree};
pub use traits::ObjectStore;
pub use vcit_types::{ObjectId, ObjectKind};
