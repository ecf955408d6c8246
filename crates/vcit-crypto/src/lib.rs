//! Content hashing for vcit.
//!
//! Object identifiers are SHA-1 digests of the framed object bytes. The
//! framing header carries the kind name and payload length, so two objects
//! with the same payload but different kinds never share an identifier.
//!
//! Hashing is delegated to `sha1_smol`.

pub mod hasher;

pub use hasher::ContentHasher;
