//! Key identifier extraction from encrypted segment bytes.
//!
//! Encrypted segments carry their key id inside a `seig` sample group
//! description entry. Rather than walking the full box tree, the scan looks
//! for the fixed 16-byte entry header and reads the key id that immediately
//! follows it; the entry layout is constant on this origin, so a byte scan
//! is equivalent to a parse. The marker is not at a fixed file position, so
//! callers scan a run of segments until one matches.

use std::fmt;
use std::path::Path;

use rw_core::{Error, Result, Tick};

/// `seig` sample group description entry header: box type, entry size,
/// entry count, and the crypt-byte/skip-byte + isProtected prefix. The
/// 16 bytes immediately after this pattern are the key id.
const KEY_ID_MARKER: [u8; 16] = [
    0x73, 0x65, 0x69, 0x67, // "seig"
    0x00, 0x00, 0x00, 0x14, // entry size
    0x00, 0x00, 0x00, 0x01, // entry count
    0x00, 0x00, 0x01, 0x10, // pattern + isProtected + per-sample IV size
];

/// Length of a key identifier in bytes.
pub const KEY_ID_LEN: usize = 16;

/// A 16-byte key identifier, rendered as 32 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyId([u8; KEY_ID_LEN]);

impl KeyId {
    /// View the raw key id bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_ID_LEN] {
        &self.0
    }

    /// Render as a 32-character lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; KEY_ID_LEN]> for KeyId {
    fn from(bytes: [u8; KEY_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self.to_hex())
    }
}

/// Scan a segment's bytes for the key id marker.
///
/// Returns `None` if the marker is absent or the buffer ends before the full
/// 16-byte identifier.
pub fn extract_key_id(data: &[u8]) -> Option<KeyId> {
    let pos = data
        .windows(KEY_ID_MARKER.len())
        .position(|w| w == KEY_ID_MARKER)?;
    let start = pos + KEY_ID_MARKER.len();
    let bytes = data.get(start..start + KEY_ID_LEN)?;

    let mut id = [0u8; KEY_ID_LEN];
    id.copy_from_slice(bytes);
    Some(KeyId(id))
}

/// Scan a directory of downloaded segments (`<tick>.m4s`) in ascending tick
/// order, returning the first key id found.
///
/// Files whose stem does not parse as a tick are ignored. `Ok(None)` means
/// every segment was scanned without a hit.
pub fn scan_segment_dir(dir: &Path) -> Result<Option<KeyId>> {
    let mut ticks: Vec<(Tick, std::path::PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("m4s") {
            continue;
        }
        let Some(tick) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<Tick>().ok())
        else {
            continue;
        };
        ticks.push((tick, path));
    }
    ticks.sort_by_key(|(tick, _)| *tick);

    for (_, path) in ticks {
        let data = std::fs::read(&path)?;
        if let Some(id) = extract_key_id(&data) {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

/// Variant of [`scan_segment_dir`] that maps an empty directory to a
/// validation error, for callers that require segments to be present.
pub fn scan_segment_dir_required(dir: &Path) -> Result<KeyId> {
    scan_segment_dir(dir)?.ok_or_else(|| {
        Error::validation(format!(
            "no key id marker found in any segment under {}",
            dir.display()
        ))
    })
}
