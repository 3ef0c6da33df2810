//! # orihon_stream
//!
//! Instruction-stream model for the orihon wiki engine.
//!
//! Markup is lexed into a flat, ordered sequence of tagged records. Nesting
//! is never materialized as a tree: enter/exit record states imply it, and
//! the engine crate walks those states to navigate the sequence as one.
//!
//! ## Architecture
//!
//! - Records are a tagged union: explicit tag records, raw text records and
//!   foreign records carried verbatim from legacy components
//! - A `Sequence` owns its records in a `Vec` and keeps a key index so that
//!   stable keys survive splices at O(1) lookup cost
//! - Classification (state, display class, captured content) is derived,
//!   total and logged on degrade paths instead of failing
//!
//! ## Example
//!
//! ```rust
//! use orihon_stream::{DisplayClass, Record, Sequence};
//!
//! let mut seq = Sequence::new();
//! seq.push(Record::enter("p"));
//! let text = seq.push(Record::text("hello "));
//! seq.push(Record::special("linebreak"));
//! seq.push(Record::exit("p"));
//!
//! assert_eq!(seq.len(), 4);
//! assert_eq!(seq.by_key(text).unwrap().display_class(), DisplayClass::Inline);
//! ```

mod attrs;
mod display;
mod error;
mod lexer;
mod record;
mod sequence;
mod span;
mod state;

pub use attrs::AttrMap;
pub use display::{DISPLAY_ATTR, DisplayClass};
pub use error::LexError;
pub use lexer::Lexer;
pub use record::{ForeignRecord, Record, RecordBody, RecordKey, TEXT_KIND, TagRecord, TextRecord};
pub use sequence::{DepthIter, Sequence};
pub use span::Span;
pub use state::{RecordState, TagState};
