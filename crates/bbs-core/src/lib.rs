//! # bbs-core
//!
//! Core types shared by every bbsync crate.
//!
//! - Board identity and per-variant URL derivation ([`board`])
//! - Listing, index, and response records ([`entities`])
//! - Closed classification tags for sync, fetch, and post outcomes ([`enums`])
//! - The byte codec for legacy 8-bit encodings ([`codec`])
//! - Collaborator seams the engine consumes but does not own ([`collab`])
//! - Cross-cutting error types ([`errors`])

pub mod board;
pub mod codec;
pub mod collab;
pub mod entities;
pub mod enums;
pub mod errors;

pub use board::{Board, BoardVariant};
pub use codec::Encoding;
pub use errors::CoreError;
