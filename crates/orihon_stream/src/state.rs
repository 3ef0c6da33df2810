//! Record state classification.
//!
//! The nesting structure of a sequence is implied entirely by record states:
//! an enter opens a region, the level-matching exit closes it, and
//! everything in between is inside the pair.

use serde::{Deserialize, Serialize};

/// Structural role of a tag record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagState {
    /// Opens a nested region.
    Enter,
    /// Closes the innermost unclosed region.
    Exit,
    /// Zero-width tag with no matching partner.
    Special,
}

/// Observed state of any record, covering non-tag shapes as well.
///
/// Text records always report [`RecordState::Unmatched`]. Foreign records
/// derive Enter/Exit from a `-open`/`-close` suffix on their raw kind and
/// report [`RecordState::None`] when neither applies; that derivation is a
/// fallback and never overrides an explicitly stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    /// Opens a nested region.
    Enter,
    /// Closes the innermost unclosed region.
    Exit,
    /// Zero-width tag, depth-neutral.
    Special,
    /// Raw captured content outside any tag match.
    Unmatched,
    /// Foreign record with no recognizable state.
    None,
}

impl RecordState {
    /// Returns true for states that participate in enter/exit pairing.
    #[inline]
    pub const fn is_paired(&self) -> bool {
        matches!(self, RecordState::Enter | RecordState::Exit)
    }

    /// Returns true for states that mark a tag boundary in sibling scans.
    ///
    /// Special records are zero-width tags: they never change the nesting
    /// level but still count as siblings.
    #[inline]
    pub const fn is_sibling_boundary(&self) -> bool {
        matches!(self, RecordState::Enter | RecordState::Special)
    }
}

impl From<TagState> for RecordState {
    #[inline]
    fn from(state: TagState) -> Self {
        match state {
            TagState::Enter => RecordState::Enter,
            TagState::Exit => RecordState::Exit,
            TagState::Special => RecordState::Special,
        }
    }
}

impl std::fmt::Display for RecordState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Use the same casing as serde serialization
        let name = match self {
            RecordState::Enter => "enter",
            RecordState::Exit => "exit",
            RecordState::Special => "special",
            RecordState::Unmatched => "unmatched",
            RecordState::None => "none",
        };
        write!(f, "{}", name)
    }
}

impl std::fmt::Display for TagState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        RecordState::from(*self).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_state() {
        assert_eq!(RecordState::from(TagState::Enter), RecordState::Enter);
        assert_eq!(RecordState::from(TagState::Exit), RecordState::Exit);
        assert_eq!(RecordState::from(TagState::Special), RecordState::Special);
    }

    #[test]
    fn test_is_paired() {
        assert!(RecordState::Enter.is_paired());
        assert!(RecordState::Exit.is_paired());
        assert!(!RecordState::Special.is_paired());
        assert!(!RecordState::Unmatched.is_paired());
        assert!(!RecordState::None.is_paired());
    }

    #[test]
    fn test_is_sibling_boundary() {
        assert!(RecordState::Enter.is_sibling_boundary());
        assert!(RecordState::Special.is_sibling_boundary());
        assert!(!RecordState::Exit.is_sibling_boundary());
        assert!(!RecordState::Unmatched.is_sibling_boundary());
    }

    #[test]
    fn test_display() {
        assert_eq!(RecordState::Enter.to_string(), "enter");
        assert_eq!(RecordState::Unmatched.to_string(), "unmatched");
        assert_eq!(TagState::Special.to_string(), "special");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&TagState::Enter).unwrap();
        assert_eq!(json, "\"enter\"");
        let state: TagState = serde_json::from_str("\"exit\"").unwrap();
        assert_eq!(state, TagState::Exit);
    }
}
