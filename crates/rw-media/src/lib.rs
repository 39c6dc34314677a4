//! rw-media: segment byte inspection.
//!
//! Downloaded media segments are opaque to the rest of rewindcast; this
//! crate holds the one piece of container knowledge the engine needs: the
//! scan that recovers the 16-byte key identifier an external decryption tool
//! requires.

pub mod keyid;

// Re-export commonly used items at the crate root.
pub use keyid::{extract_key_id, scan_segment_dir, KeyId, KEY_ID_LEN};
