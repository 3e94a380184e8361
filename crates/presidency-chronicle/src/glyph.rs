//! Glyph archive encoder.
//!
//! Produces the compact symbolic string shown when a presidency is archived:
//!
//! 1. the payload is serialized to canonical JSON (object keys sorted,
//!    compact separators),
//! 2. the bytes are compressed with raw DEFLATE,
//! 3. the compressed buffer is base64-encoded,
//! 4. every base64 character is mapped, by code point modulo the alphabet
//!    size, to one glyph of [`GLYPHS`].
//!
//! The transform is deterministic, so identical payloads always produce
//! identical glyph strings. It is deliberately one-way: several base64
//! characters share a glyph and there is no decoder. Keep the JSON payload
//! (see [`SealedArchive`]) wherever the original data is needed again.
//!
//! # Example
//!
//! ```
//! use presidency_chronicle::glyph::{encode_archive, GLYPHS};
//!
//! let payload = serde_json::json!({ "president": "Ada", "chaos": 12 });
//! let glyphs = encode_archive(&payload).unwrap();
//!
//! assert!(glyphs.chars().all(|g| GLYPHS.contains(&g)));
//! assert_eq!(glyphs, encode_archive(&payload).unwrap());
//! ```

use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use presidency_core::PresidencyError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The ornamental alphabet. Order and membership are fixed forever: changing
/// either changes every archive ever rendered.
pub const GLYPHS: [char; 32] = [
    '✦', '✧', '✩', '✪', '✫', '✬', '✭', '✮', '✯', '✰', //
    '❂', '❃', '❄', '❅', '❆', '❇', '❈', '❉', '❊', '❋', //
    '☉', '☽', '☾', '♁', '♃', '♄', '♅', '♆', '♇', '⚝', //
    '⚶', '⚷',
];

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

fn serialization_failure(e: impl std::fmt::Display) -> PresidencyError {
    PresidencyError::SerializationFailure(e.to_string())
}

/// Rebuild every object with its keys in sorted order, independent of the
/// map backend serde_json was compiled with.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serialize `payload` to canonical JSON bytes.
///
/// # Errors
///
/// Returns [`PresidencyError::SerializationFailure`] if the payload cannot be
/// represented as JSON (for example a map with non-string keys).
pub fn canonical_json<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<u8>, PresidencyError> {
    let value = serde_json::to_value(payload).map_err(serialization_failure)?;
    serde_json::to_vec(&canonicalize(value)).map_err(serialization_failure)
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>, PresidencyError> {
    let mut encoder =
        DeflateEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::default());
    encoder.write_all(bytes).map_err(serialization_failure)?;
    encoder.finish().map_err(serialization_failure)
}

/// Map printable text onto the glyph alphabet, one glyph per character.
pub fn render_glyphs(text: &str) -> String {
    text.chars()
        .map(|c| GLYPHS[c as usize % GLYPHS.len()])
        .collect()
}

fn glyphs_for_json(json: &[u8]) -> Result<String, PresidencyError> {
    let compressed = deflate(json)?;
    Ok(render_glyphs(&STANDARD.encode(compressed)))
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Encode `payload` as a glyph string.
///
/// # Errors
///
/// Returns [`PresidencyError::SerializationFailure`] if the payload is not
/// JSON-serializable. No partial output is produced.
pub fn encode_archive<T: Serialize + ?Sized>(payload: &T) -> Result<String, PresidencyError> {
    glyphs_for_json(&canonical_json(payload)?)
}

/// BLAKE3 hex digest (64 lowercase hex chars) of the canonical JSON form of
/// `payload`. Structurally identical payloads share a digest.
pub fn content_digest<T: Serialize + ?Sized>(payload: &T) -> Result<String, PresidencyError> {
    Ok(blake3::hash(&canonical_json(payload)?).to_hex().to_string())
}

// ---------------------------------------------------------------------------
// SealedArchive
// ---------------------------------------------------------------------------

/// A payload together with its glyph rendering and content digest.
///
/// The JSON `payload` is retained because the glyphs cannot be decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealedArchive {
    /// Glyph rendering, one glyph per base64 character.
    pub glyphs: String,
    /// BLAKE3 hex digest of the canonical payload.
    pub digest: String,
    /// The payload in canonical key order.
    pub payload: Value,
}

impl SealedArchive {
    /// Serialize once and derive the glyphs and digest from the same bytes.
    pub fn seal<T: Serialize + ?Sized>(payload: &T) -> Result<Self, PresidencyError> {
        let value = canonicalize(serde_json::to_value(payload).map_err(serialization_failure)?);
        let json = serde_json::to_vec(&value).map_err(serialization_failure)?;
        let glyphs = glyphs_for_json(&json)?;
        let digest = blake3::hash(&json).to_hex().to_string();
        tracing::debug!(
            json_bytes = json.len(),
            glyphs = glyphs.chars().count(),
            %digest,
            "sealed archive"
        );
        Ok(Self {
            glyphs,
            digest,
            payload: value,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use super::*;

    #[test]
    fn alphabet_has_no_duplicates() {
        let mut seen = std::collections::BTreeSet::new();
        for g in GLYPHS {
            assert!(seen.insert(g), "duplicate glyph {g}");
        }
    }

    #[test]
    fn every_base64_character_maps_into_the_alphabet() {
        let b64 = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/=";
        let rendered = render_glyphs(b64);
        assert_eq!(rendered.chars().count(), b64.len());
        assert!(rendered.chars().all(|g| GLYPHS.contains(&g)));
    }

    #[test]
    fn glyph_mapping_uses_code_point_modulo() {
        // 'A' = 65, 65 % 32 = 1; 'a' = 97, 97 % 32 = 1; '+' = 43, 43 % 32 = 11.
        assert_eq!(render_glyphs("A"), GLYPHS[1].to_string());
        assert_eq!(render_glyphs("a"), GLYPHS[1].to_string());
        assert_eq!(render_glyphs("+"), GLYPHS[11].to_string());
    }

    #[test]
    fn glyph_count_matches_base64_length() {
        let payload = serde_json::json!({ "a": 1 });
        let json = canonical_json(&payload).unwrap();
        let b64 = STANDARD.encode(deflate(&json).unwrap());
        let glyphs = encode_archive(&payload).unwrap();
        assert_eq!(glyphs.chars().count(), b64.len());
    }

    #[test]
    fn canonical_json_sorts_keys_at_every_depth() {
        let payload = serde_json::json!({ "b": { "z": 1, "a": 2 }, "a": [ { "y": 0, "x": 0 } ] });
        let json = String::from_utf8(canonical_json(&payload).unwrap()).unwrap();
        assert_eq!(json, r#"{"a":[{"x":0,"y":0}],"b":{"a":2,"z":1}}"#);
    }

    #[test]
    fn hash_map_ordering_does_not_leak_into_output() {
        let mut forward = HashMap::new();
        let mut backward = HashMap::new();
        for i in 0..64 {
            forward.insert(format!("k{i}"), i);
        }
        for i in (0..64).rev() {
            backward.insert(format!("k{i}"), i);
        }
        assert_eq!(encode_archive(&forward).unwrap(), encode_archive(&backward).unwrap());
        assert_eq!(content_digest(&forward).unwrap(), content_digest(&backward).unwrap());
    }

    #[test]
    fn different_payloads_differ() {
        let a = encode_archive(&serde_json::json!({ "chaos": 1 })).unwrap();
        let b = encode_archive(&serde_json::json!({ "chaos": 2 })).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn non_string_keys_are_a_serialization_failure() {
        let mut bad: BTreeMap<(i32, i32), i32> = BTreeMap::new();
        bad.insert((1, 2), 3);
        let err = encode_archive(&bad).unwrap_err();
        assert!(matches!(err, PresidencyError::SerializationFailure(_)));
        assert!(matches!(
            SealedArchive::seal(&bad),
            Err(PresidencyError::SerializationFailure(_))
        ));
    }

    #[test]
    fn sealed_archive_agrees_with_free_functions() {
        let payload = serde_json::json!({ "laws": 3, "president": "Grace" });
        let sealed = SealedArchive::seal(&payload).unwrap();
        assert_eq!(sealed.glyphs, encode_archive(&payload).unwrap());
        assert_eq!(sealed.digest, content_digest(&payload).unwrap());
        assert_eq!(sealed.digest.len(), 64);
        assert_eq!(sealed.payload, payload);
    }
}
