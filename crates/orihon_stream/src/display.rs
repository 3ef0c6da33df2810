//! Display classification of record kinds.
//!
//! Renderers branch on whether a record opens inline, block or table
//! content. The class is derived, never stored: an explicit `display`
//! attribute wins, unmatched text is always inline, and known tag kinds are
//! looked up in a static catalog.

use serde::{Deserialize, Serialize};

/// Attribute key overriding the derived display class.
pub const DISPLAY_ATTR: &str = "display";

/// Layout class a record renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayClass {
    /// Flows within a line of text.
    Inline,
    /// Starts its own block.
    Block,
    /// Table structure element.
    Table,
    /// Kind not present in the catalog and no override given.
    Unknown,
}

impl DisplayClass {
    /// Parses an explicit `display` attribute value.
    ///
    /// `Unknown` is not accepted as an override; a record can only be
    /// unknown by falling through the whole derivation.
    pub fn from_override(value: &str) -> Option<Self> {
        match value {
            "inline" => Some(DisplayClass::Inline),
            "block" => Some(DisplayClass::Block),
            "table" => Some(DisplayClass::Table),
            _ => None,
        }
    }

    /// Looks up the catalog class for a tag kind.
    ///
    /// Kinds are the suffix-stripped tag names, so `"p"` covers both
    /// `p-open` and `p-close` shaped records.
    pub fn of_kind(name: &str) -> Option<Self> {
        if is_block_kind(name) {
            Some(DisplayClass::Block)
        } else if is_table_kind(name) {
            Some(DisplayClass::Table)
        } else if is_inline_kind(name) {
            Some(DisplayClass::Inline)
        } else {
            None
        }
    }
}

impl std::fmt::Display for DisplayClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Use the same casing as serde serialization
        let name = match self {
            DisplayClass::Inline => "inline",
            DisplayClass::Block => "block",
            DisplayClass::Table => "table",
            DisplayClass::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Returns true if the kind is a block element.
fn is_block_kind(name: &str) -> bool {
    matches!(
        name,
        "document"
            | "section"
            | "header"
            | "p"
            | "listu"
            | "listo"
            | "listitem"
            | "listcontent"
            | "quote"
            | "preformatted"
            | "code"
            | "file"
            | "hr"
            | "nest"
            | "rss"
    )
}

/// Returns true if the kind is a table structure element.
fn is_table_kind(name: &str) -> bool {
    matches!(name, "table" | "tablerow" | "tablecell" | "tableheader")
}

/// Returns true if the kind is an inline element.
fn is_inline_kind(name: &str) -> bool {
    matches!(
        name,
        "text"
            | "strong"
            | "emphasis"
            | "underline"
            | "monospace"
            | "subscript"
            | "superscript"
            | "deleted"
            | "footnote"
            | "linebreak"
            | "unformatted"
            | "entity"
            | "smiley"
            | "acronym"
            | "internallink"
            | "externallink"
            | "interwikilink"
            | "emaillink"
            | "windowssharelink"
            | "filelink"
            | "locallink"
            | "media"
    )
}
