//! Opaque identifier for a track within the origin.
//!
//! The core never interprets the contents of a [`TrackId`]; it is only ever
//! embedded verbatim into origin URLs and output directory names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque track address, private to the origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// View the track address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TrackId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_input() {
        let id = TrackId::from("0_1_3524");
        assert_eq!(id.to_string(), "0_1_3524");
        assert_eq!(id.as_str(), "0_1_3524");
    }

    #[test]
    fn serde_is_transparent() {
        let id = TrackId::from("0_1_384");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0_1_384\"");
        let back: TrackId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn hash_set_usage() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(TrackId::from("a"));
        assert!(set.contains(&TrackId::from("a")));
    }
}
