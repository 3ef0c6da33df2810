//! Record definition.
//!
//! The core instruction record type used throughout orihon. A rendered
//! document is a flat sequence of these records; nesting exists only through
//! enter/exit states, never as owned child collections.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{AttrMap, DISPLAY_ATTR, DisplayClass, RecordState, TagState};

/// Kind string reported by raw text records.
pub const TEXT_KIND: &str = "text";

/// Shared empty map handed out when attributes are read off a record shape
/// that cannot carry them.
static EMPTY_ATTRS: AttrMap = AttrMap::new();

/// Stable identity of a record within a sequence.
///
/// Keys survive the index shifts caused by splicing; they are the only
/// record identity callers may hold across mutations. A key is stamped by
/// the owning [`Sequence`](crate::Sequence) and never reused, so stale keys
/// stay detectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(u64);

impl RecordKey {
    /// Key of a record not yet adopted by a sequence.
    pub const UNSET: RecordKey = RecordKey(0);

    #[inline]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns true if this record has not been stamped by a sequence.
    #[inline]
    pub const fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record in the instruction stream.
///
/// Records come in three shapes: tag records with an explicit state, raw
/// text records, and foreign records whose state can only be guessed from
/// their kind string. All classification methods are total; mutators
/// validate the shape and degrade to a logged no-op instead of panicking,
/// since streams routinely carry records minted by third-party lexer
/// components.
///
/// # Example
///
/// ```rust
/// use orihon_stream::{DisplayClass, Record, RecordState};
///
/// let open = Record::enter("strong").with_source_pos(4);
/// assert_eq!(open.state(), RecordState::Enter);
/// assert_eq!(open.display_class(), DisplayClass::Inline);
///
/// let legacy = Record::foreign("plugin_gallery-open");
/// assert_eq!(legacy.state(), RecordState::Enter);
/// assert_eq!(legacy.tag_name(), "plugin_gallery");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RecordWire", into = "RecordWire")]
pub struct Record {
    key: RecordKey,
    body: RecordBody,
}

/// Shape-specific record storage.
#[derive(Debug, Clone)]
pub enum RecordBody {
    /// Tag-bearing record with an explicit state.
    Tag(TagRecord),
    /// Raw captured content.
    Text(TextRecord),
    /// Legacy or third-party record carried verbatim.
    Foreign(ForeignRecord),
}

/// Body of a tag-bearing record.
#[derive(Debug, Clone)]
pub struct TagRecord {
    /// Tag name without any state suffix.
    pub name: String,
    /// Explicit structural state.
    pub state: TagState,
    /// Attribute map; exit records keep theirs empty.
    pub attrs: AttrMap,
    /// Auxiliary lexer data, independent of attributes.
    pub payload: Option<String>,
    /// Byte offset of the first matched character in the source.
    pub source_pos: Option<u32>,
}

/// Body of a raw text record.
#[derive(Debug, Clone)]
pub struct TextRecord {
    /// Captured content, stored verbatim.
    pub content: String,
    /// Byte offset of the first matched character in the source.
    pub source_pos: Option<u32>,
}

/// Body of a foreign record.
#[derive(Debug, Clone)]
pub struct ForeignRecord {
    /// Raw kind string, state suffix included.
    pub kind: String,
    /// Auxiliary lexer data.
    pub payload: Option<String>,
    /// Byte offset of the first matched character in the source.
    pub source_pos: Option<u32>,
}

impl Record {
    /// Creates an enter tag record.
    pub fn enter(name: impl Into<String>) -> Self {
        Self::tag(name, TagState::Enter)
    }

    /// Creates an exit tag record.
    pub fn exit(name: impl Into<String>) -> Self {
        Self::tag(name, TagState::Exit)
    }

    /// Creates a special (zero-width) tag record.
    pub fn special(name: impl Into<String>) -> Self {
        Self::tag(name, TagState::Special)
    }

    /// Creates a tag record with the given state.
    pub fn tag(name: impl Into<String>, state: TagState) -> Self {
        Self {
            key: RecordKey::UNSET,
            body: RecordBody::Tag(TagRecord {
                name: name.into(),
                state,
                attrs: AttrMap::new(),
                payload: None,
                source_pos: None,
            }),
        }
    }

    /// Creates a raw text record.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            key: RecordKey::UNSET,
            body: RecordBody::Text(TextRecord {
                content: content.into(),
                source_pos: None,
            }),
        }
    }

    /// Creates a foreign record from a raw kind string.
    pub fn foreign(kind: impl Into<String>) -> Self {
        Self {
            key: RecordKey::UNSET,
            body: RecordBody::Foreign(ForeignRecord {
                kind: kind.into(),
                payload: None,
                source_pos: None,
            }),
        }
    }

    /// Sets an attribute, chainable form of [`Record::set_attr`].
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Sets the payload, chainable form of [`Record::set_payload`].
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.set_payload(Some(payload.into()));
        self
    }

    /// Sets the source position, chainable form of [`Record::set_source_pos`].
    pub fn with_source_pos(mut self, pos: u32) -> Self {
        self.set_source_pos(Some(pos));
        self
    }

    /// Returns the stable key of this record.
    ///
    /// [`RecordKey::UNSET`] until the record is inserted into a sequence.
    #[inline]
    pub const fn key(&self) -> RecordKey {
        self.key
    }

    pub(crate) fn set_key(&mut self, key: RecordKey) {
        self.key = key;
    }

    /// Returns a read-only view of the shape-specific body.
    #[inline]
    pub const fn body(&self) -> &RecordBody {
        &self.body
    }

    /// Returns the raw kind identifier.
    ///
    /// Tag records report their name, text records report [`TEXT_KIND`] and
    /// foreign records report their kind string verbatim, suffix included.
    pub fn kind(&self) -> &str {
        match &self.body {
            RecordBody::Tag(tag) => &tag.name,
            RecordBody::Text(_) => TEXT_KIND,
            RecordBody::Foreign(foreign) => &foreign.kind,
        }
    }

    /// Returns the kind with any `-open`/`-close` state suffix stripped.
    ///
    /// Tag records carry an explicit name that is returned untouched even
    /// if it happens to end in a state suffix; string stripping only ever
    /// applies to foreign records.
    pub fn tag_name(&self) -> &str {
        match &self.body {
            RecordBody::Tag(tag) => &tag.name,
            RecordBody::Text(_) => TEXT_KIND,
            RecordBody::Foreign(foreign) => strip_state_suffix(&foreign.kind),
        }
    }

    /// Returns the structural state of this record.
    ///
    /// Foreign records derive Enter/Exit from their kind suffix and fall
    /// back to [`RecordState::None`]; explicit states are never
    /// reinterpreted.
    pub fn state(&self) -> RecordState {
        match &self.body {
            RecordBody::Tag(tag) => tag.state.into(),
            RecordBody::Text(_) => RecordState::Unmatched,
            RecordBody::Foreign(foreign) => derived_state(&foreign.kind),
        }
    }

    /// Returns the layout class this record renders as.
    ///
    /// Derivation order: explicit `display` attribute override, then the
    /// unmatched-is-inline rule, then the static kind catalog. Unknown kinds
    /// are logged and classified [`DisplayClass::Unknown`]; the result is
    /// always defined.
    pub fn display_class(&self) -> DisplayClass {
        if let Some(value) = self.attr(DISPLAY_ATTR) {
            match DisplayClass::from_override(value) {
                Some(class) => return class,
                None => warn!(
                    "Ignoring invalid display override {:?} on kind {}",
                    value,
                    self.kind()
                ),
            }
        }
        if self.state() == RecordState::Unmatched {
            return DisplayClass::Inline;
        }
        match DisplayClass::of_kind(self.tag_name()) {
            Some(class) => class,
            None => {
                warn!("No display class for kind {}", self.kind());
                DisplayClass::Unknown
            }
        }
    }

    /// Returns the byte offset of the first matched source character.
    pub fn source_pos(&self) -> Option<u32> {
        match &self.body {
            RecordBody::Tag(tag) => tag.source_pos,
            RecordBody::Text(text) => text.source_pos,
            RecordBody::Foreign(foreign) => foreign.source_pos,
        }
    }

    /// Returns the auxiliary lexer payload, if any.
    pub fn payload(&self) -> Option<&str> {
        match &self.body {
            RecordBody::Tag(tag) => tag.payload.as_deref(),
            RecordBody::Foreign(foreign) => foreign.payload.as_deref(),
            RecordBody::Text(_) => None,
        }
    }

    /// Returns the textual content this record contributes.
    ///
    /// Text records return their stored content. A few primitive tag kinds
    /// reconstruct content instead of storing it: `linebreak` yields a
    /// newline and `entity`/`smiley` yield their payload verbatim. All
    /// other records contribute nothing.
    pub fn captured_content(&self) -> Option<Cow<'_, str>> {
        match &self.body {
            RecordBody::Text(text) => Some(Cow::Borrowed(text.content.as_str())),
            RecordBody::Tag(tag) if tag.name == "linebreak" => Some(Cow::Borrowed("\n")),
            RecordBody::Tag(tag) if tag.name == "entity" || tag.name == "smiley" => {
                tag.payload.as_deref().map(Cow::Borrowed)
            }
            _ => None,
        }
    }

    /// Returns true if this record can carry attribute writes.
    ///
    /// Exit records never do; their rendering is fully determined by the
    /// matching enter.
    pub fn has_attributes(&self) -> bool {
        matches!(&self.body, RecordBody::Tag(tag) if tag.state != TagState::Exit)
    }

    /// Returns true if this record stores raw text content.
    pub fn has_text_content(&self) -> bool {
        matches!(&self.body, RecordBody::Text(_))
    }

    /// Returns true if this record participates in enter/exit pairing.
    pub fn has_matching_pair(&self) -> bool {
        self.state().is_paired()
    }

    /// Returns the attribute map.
    ///
    /// Record shapes without attribute storage log a warning and return a
    /// shared empty map rather than failing.
    pub fn attrs(&self) -> &AttrMap {
        match &self.body {
            RecordBody::Tag(tag) => &tag.attrs,
            _ => {
                warn!("Attribute access on non-tag record: kind={}", self.kind());
                &EMPTY_ATTRS
            }
        }
    }

    /// Returns a mutable attribute map for records that accept writes.
    pub fn attrs_mut(&mut self) -> Option<&mut AttrMap> {
        if !self.has_attributes() {
            warn!(
                "Mutable attribute access on {} record: kind={}",
                self.state(),
                self.kind()
            );
            return None;
        }
        match &mut self.body {
            RecordBody::Tag(tag) => Some(&mut tag.attrs),
            _ => None,
        }
    }

    /// Returns a single attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match &self.body {
            RecordBody::Tag(tag) => tag.attrs.get(key),
            _ => None,
        }
    }

    /// Sets an attribute. Returns false (and logs) if this record shape
    /// rejects attribute writes.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        match self.attrs_mut() {
            Some(attrs) => {
                attrs.set(key, value);
                true
            }
            None => false,
        }
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        self.attrs_mut().and_then(|attrs| attrs.remove(key))
    }

    /// Replaces the explicit state of a tag record.
    ///
    /// Text and foreign records have no explicit state to replace; the call
    /// is logged and ignored for them.
    pub fn set_state(&mut self, state: TagState) -> bool {
        match &mut self.body {
            RecordBody::Tag(tag) => {
                tag.state = state;
                true
            }
            _ => {
                warn!("Ignoring state change on non-tag record: kind={}", self.kind());
                false
            }
        }
    }

    /// Replaces the stored content of a text record.
    pub fn set_content(&mut self, content: impl Into<String>) -> bool {
        match &mut self.body {
            RecordBody::Text(text) => {
                text.content = content.into();
                true
            }
            _ => {
                warn!("Ignoring content change on non-text record: kind={}", self.kind());
                false
            }
        }
    }

    /// Replaces the payload of a tag or foreign record.
    pub fn set_payload(&mut self, payload: Option<String>) -> bool {
        match &mut self.body {
            RecordBody::Tag(tag) => {
                tag.payload = payload;
                true
            }
            RecordBody::Foreign(foreign) => {
                foreign.payload = payload;
                true
            }
            RecordBody::Text(_) => {
                warn!("Ignoring payload change on text record");
                false
            }
        }
    }

    /// Replaces the source position. Every record shape carries one.
    pub fn set_source_pos(&mut self, pos: Option<u32>) {
        match &mut self.body {
            RecordBody::Tag(tag) => tag.source_pos = pos,
            RecordBody::Text(text) => text.source_pos = pos,
            RecordBody::Foreign(foreign) => foreign.source_pos = pos,
        }
    }
}

/// Strips a single `-open`/`-close` suffix from a raw kind string.
fn strip_state_suffix(kind: &str) -> &str {
    kind.strip_suffix("-open")
        .or_else(|| kind.strip_suffix("-close"))
        .unwrap_or(kind)
}

/// Derives the state of a foreign record from its kind suffix.
fn derived_state(kind: &str) -> RecordState {
    if kind.ends_with("-open") {
        RecordState::Enter
    } else if kind.ends_with("-close") {
        RecordState::Exit
    } else {
        RecordState::None
    }
}

/// Compact wire shape. Keys are session identities and are not serialized;
/// deserialized records come back unset and get re-stamped by the sequence.
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RecordWire {
    Tag {
        name: String,
        state: TagState,
        #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
        attrs: AttrMap,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pos: Option<u32>,
    },
    Text {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pos: Option<u32>,
    },
    Foreign {
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pos: Option<u32>,
    },
}

impl From<Record> for RecordWire {
    fn from(record: Record) -> Self {
        match record.body {
            RecordBody::Tag(tag) => RecordWire::Tag {
                name: tag.name,
                state: tag.state,
                attrs: tag.attrs,
                payload: tag.payload,
                pos: tag.source_pos,
            },
            RecordBody::Text(text) => RecordWire::Text {
                content: text.content,
                pos: text.source_pos,
            },
            RecordBody::Foreign(foreign) => RecordWire::Foreign {
                kind: foreign.kind,
                payload: foreign.payload,
                pos: foreign.source_pos,
            },
        }
    }
}

impl From<RecordWire> for Record {
    fn from(wire: RecordWire) -> Self {
        let body = match wire {
            RecordWire::Tag {
                name,
                state,
                attrs,
                payload,
                pos,
            } => RecordBody::Tag(TagRecord {
                name,
                state,
                attrs,
                payload,
                source_pos: pos,
            }),
            RecordWire::Text { content, pos } => RecordBody::Text(TextRecord {
                content,
                source_pos: pos,
            }),
            RecordWire::Foreign { kind, payload, pos } => RecordBody::Foreign(ForeignRecord {
                kind,
                payload,
                source_pos: pos,
            }),
        };
        Self {
            key: RecordKey::UNSET,
            body,
        }
    }
}
