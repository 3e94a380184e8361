//! Presidency Chronicle - archives and timelines for presidency sessions.
//!
//! This crate turns session state into durable, human-facing artifacts. It
//! never mutates a session; it only reads what the core produced.
//!
//! # Modules
//!
//! - [`glyph`]: Archive encoder. Serializes any JSON-serializable payload to
//!   canonical JSON, deflates it, base64-encodes it and renders the result in
//!   a fixed ornamental glyph alphabet. Deterministic and one-way.
//! - [`timeline`]: Append-only journal of what happened in a session (actions
//!   resolved, achievements unlocked, rebellion warnings, the end of the
//!   session, archives taken), with query helpers and rendered log lines.

#![deny(unsafe_code)]

pub mod glyph;
pub mod timeline;

pub use glyph::{canonical_json, content_digest, encode_archive, SealedArchive, GLYPHS};
pub use timeline::{ArchiveKind, EntryKind, Timeline, TimelineEntry};
