//! # orihon_engine
//!
//! Cursor-based navigation and rewriting for orihon instruction sequences.
//!
//! The lexer hands rendering a flat sequence of records; this crate is what
//! makes that sequence walkable as a tree. A [`Cursor`] tracks one position
//! (including the two sentinel states on either side of the stream), every
//! structural edit leaves it somewhere defined, and the tree lookups are
//! level-counting linear scans over the enter/exit states rather than a
//! materialized tree.
//!
//! ## Architecture
//!
//! - `cursor`: positioning, stepwise motion and the structural-edit
//!   primitives with their rebase rules
//! - `tree`: matching open/close, parent, sibling and child lookups
//! - `rewrite`: key-addressed bulk removal and the subtree capture pattern
//! - `validate`: balance checking, reported as data
//!
//! ## Example
//!
//! ```rust
//! use orihon_engine::Cursor;
//! use orihon_stream::{Record, Sequence};
//!
//! let mut seq = Sequence::from_records(vec![
//!     Record::enter("div"),
//!     Record::text("hi"),
//!     Record::enter("span"),
//!     Record::exit("span"),
//!     Record::exit("div"),
//! ]);
//!
//! let mut cursor = Cursor::new(&mut seq);
//! cursor.move_to_index(0);
//! assert!(cursor.move_to_matching_close());
//! assert_eq!(cursor.index(), Some(4));
//! ```

mod cursor;
mod error;
mod rewrite;
mod tree;
mod validate;

pub use cursor::{Cursor, CursorPos};
pub use error::RewriteError;
pub use validate::{BalanceIssue, check_balance, is_balanced};
