//! Foundation types for vcit.
//!
//! Every other vcit crate depends on `vcit-types`. It holds the identifiers
//! and tags shared by the hasher, the object store and the repository layer.
//!
//! # Key Types
//!
//! - [`ObjectId`] — Content-addressed identifier (160-bit SHA-1 digest)
//! - [`ObjectKind`] — The closed set of stored object kinds

pub mod error;
pub mod kind;
pub mod object;

pub use error::TypeError;
pub use kind::ObjectKind;
pub use object::ObjectId;
