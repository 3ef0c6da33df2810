//! Bulk rewrites addressed by stable keys.
//!
//! The common rewrite pattern captures a subtree into a side buffer, deletes
//! it from the sequence, regenerates records from the buffer and splices
//! them back in. Boundaries are named by stable keys, because indices shift
//! under the caller between the capture and the delete.

use std::ops::Bound;

use tracing::warn;

use orihon_stream::{Record, RecordKey, RecordState};

use crate::cursor::{Cursor, CursorPos};
use crate::error::RewriteError;

impl Cursor<'_> {
    /// Removes a contiguous run of records bounded by stable keys.
    ///
    /// `Bound::Excluded` keeps the boundary record, `Bound::Included`
    /// removes it, `Bound::Unbounded` extends the run to the respective end
    /// of the sequence. A key that no longer resolves is a stale-key
    /// contract violation and returns a typed error, so callers can tell it
    /// apart from a legitimately empty run.
    ///
    /// The cursor is rebased: unaffected positions keep their record,
    /// positions inside the removed run land just before it (or at the
    /// before-start sentinel when the run begins at the head).
    ///
    /// Returns the number of records removed.
    pub fn remove_range(
        &mut self,
        from: Bound<RecordKey>,
        to: Bound<RecordKey>,
    ) -> Result<usize, RewriteError> {
        let start = match from {
            Bound::Included(key) => self.resolve(key)?,
            Bound::Excluded(key) => self.resolve(key)? + 1,
            Bound::Unbounded => 0,
        };
        let end = match to {
            Bound::Included(key) => self.resolve(key)? + 1,
            Bound::Excluded(key) => self.resolve(key)?,
            Bound::Unbounded => self.seq.len(),
        };
        if start > end {
            return Err(RewriteError::inverted(start, end));
        }

        let removed = end - start;
        self.seq.drain_span(start..end);
        if let CursorPos::At(idx) = self.pos {
            self.pos = if idx < start {
                CursorPos::At(idx)
            } else if idx < end {
                if start == 0 {
                    CursorPos::BeforeStart
                } else {
                    CursorPos::At(start - 1)
                }
            } else {
                CursorPos::At(idx - removed)
            };
        }
        Ok(removed)
    }

    /// Removes every record strictly before the one with the given key.
    pub fn remove_all_before(&mut self, key: RecordKey) -> Result<usize, RewriteError> {
        self.remove_range(Bound::Unbounded, Bound::Excluded(key))
    }

    /// Removes every record strictly after the one with the given key.
    pub fn remove_all_after(&mut self, key: RecordKey) -> Result<usize, RewriteError> {
        self.remove_range(Bound::Excluded(key), Bound::Unbounded)
    }

    /// Removes every record strictly between two boundary records, both of
    /// which survive. The usual form for clearing a known enter/exit pair.
    pub fn remove_between(
        &mut self,
        open: RecordKey,
        close: RecordKey,
    ) -> Result<usize, RewriteError> {
        self.remove_range(Bound::Excluded(open), Bound::Excluded(close))
    }

    /// Extracts everything between the current enter record and its
    /// matching exit, leaving the pair in place and the cursor on the enter.
    ///
    /// The extracted records keep their stable keys, so re-splicing them
    /// (or a subset) preserves identity. On a precondition violation (not
    /// on an enter, or the pair never closes) nothing is mutated and the
    /// result is empty, logged.
    pub fn take_children(&mut self) -> Vec<Record> {
        let CursorPos::At(idx) = self.pos else {
            warn!("take_children at cursor sentinel: {:?}", self.pos);
            return Vec::new();
        };
        let on_enter = self
            .seq
            .get(idx)
            .is_some_and(|r| r.state() == RecordState::Enter);
        if !on_enter {
            warn!(
                "take_children requires an enter record, cursor is on '{}'",
                self.seq.get(idx).map_or("?", |r| r.kind())
            );
            return Vec::new();
        }
        let Some(close) = self.scan_close_from(idx) else {
            warn!(
                "take_children: no matching exit for '{}' at index {}",
                self.seq.get(idx).map_or("?", |r| r.tag_name()),
                idx
            );
            return Vec::new();
        };
        self.seq.drain_span(idx + 1..close)
    }

    fn resolve(&self, key: RecordKey) -> Result<usize, RewriteError> {
        self.locate(key).ok_or(RewriteError::BoundaryNotFound(key))
    }
}

#[cfg(test)]
mod tests {
    use orihon_stream::{Record, Sequence};
    use pretty_assertions::assert_eq;

    use super::*;

    /// `[quote-enter, "a", note-enter, "b", note-exit, "c", quote-exit]`
    fn quoted() -> Sequence {
        Sequence::from_records(vec![
            Record::enter("quote"),
            Record::text("a"),
            Record::enter("note"),
            Record::text("b"),
            Record::exit("note"),
            Record::text("c"),
            Record::exit("quote"),
        ])
    }

    fn contents(seq: &Sequence) -> Vec<String> {
        seq.iter()
            .map(|r| {
                r.captured_content()
                    .map(|c| c.into_owned())
                    .unwrap_or_else(|| format!("{}-{}", r.tag_name(), r.state()))
            })
            .collect()
    }

    #[test]
    fn remove_between_keeps_boundaries() {
        let mut seq = quoted();
        let open = seq.key_at(0).unwrap();
        let close = seq.key_at(6).unwrap();
        let mut cursor = Cursor::new(&mut seq);

        let removed = cursor.remove_between(open, close).unwrap();

        assert_eq!(removed, 5);
        assert_eq!(
            contents(cursor.sequence()),
            vec!["quote-enter", "quote-exit"]
        );
    }

    #[test]
    fn remove_range_inclusive_bounds() {
        let mut seq = quoted();
        let from = seq.key_at(2).unwrap();
        let to = seq.key_at(4).unwrap();
        let mut cursor = Cursor::new(&mut seq);

        let removed = cursor
            .remove_range(Bound::Included(from), Bound::Included(to))
            .unwrap();

        assert_eq!(removed, 3);
        assert_eq!(
            contents(cursor.sequence()),
            vec!["quote-enter", "a", "c", "quote-exit"]
        );
    }

    #[test]
    fn remove_all_before_and_after() {
        let mut seq = quoted();
        let anchor = seq.key_at(3).unwrap(); // the "b" text
        let mut cursor = Cursor::new(&mut seq);

        assert_eq!(cursor.remove_all_before(anchor).unwrap(), 3);
        assert_eq!(cursor.remove_all_after(anchor).unwrap(), 3);
        assert_eq!(contents(cursor.sequence()), vec!["b"]);
    }

    #[test]
    fn stale_boundary_key_is_typed_error() {
        let mut seq = quoted();
        let gone = seq.key_at(1).unwrap();
        seq.remove_at(1);
        let mut cursor = Cursor::new(&mut seq);

        assert_eq!(
            cursor.remove_all_after(gone),
            Err(RewriteError::BoundaryNotFound(gone))
        );
        assert_eq!(cursor.sequence().len(), 6);
    }

    #[test]
    fn inverted_range_is_typed_error() {
        let mut seq = quoted();
        let from = seq.key_at(4).unwrap();
        let to = seq.key_at(2).unwrap();
        let mut cursor = Cursor::new(&mut seq);

        assert!(matches!(
            cursor.remove_range(Bound::Included(from), Bound::Included(to)),
            Err(RewriteError::InvertedRange { .. })
        ));
        assert_eq!(cursor.sequence().len(), 7);
    }

    #[test]
    fn empty_run_removes_nothing() {
        let mut seq = quoted();
        let open = seq.key_at(2).unwrap();
        let close = seq.key_at(4).unwrap();
        seq.drain_span(3..4); // pair is now adjacent
        let mut cursor = Cursor::new(&mut seq);

        assert_eq!(cursor.remove_between(open, close).unwrap(), 0);
    }

    #[test]
    fn cursor_before_run_is_unaffected() {
        let mut seq = quoted();
        let open = seq.key_at(2).unwrap();
        let close = seq.key_at(4).unwrap();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(1);
        let anchor = cursor.current_key().unwrap();

        cursor.remove_between(open, close).unwrap();

        assert_eq!(cursor.index(), Some(1));
        assert_eq!(cursor.current_key(), Some(anchor));
    }

    #[test]
    fn cursor_after_run_shifts_left() {
        let mut seq = quoted();
        let open = seq.key_at(2).unwrap();
        let close = seq.key_at(4).unwrap();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(5); // the "c" text
        let anchor = cursor.current_key().unwrap();

        cursor.remove_between(open, close).unwrap();

        assert_eq!(cursor.index(), Some(4));
        assert_eq!(cursor.current_key(), Some(anchor));
    }

    #[test]
    fn cursor_inside_run_lands_before_it() {
        let mut seq = quoted();
        let anchor = seq.key_at(5).unwrap(); // "c"
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(2);

        cursor.remove_range(Bound::Included(anchor), Bound::Unbounded).unwrap();
        assert_eq!(cursor.index(), Some(2)); // unaffected, run was behind it

        let head = cursor.sequence().key_at(0).unwrap();
        cursor.remove_range(Bound::Included(head), Bound::Unbounded).unwrap();
        assert_eq!(cursor.pos(), CursorPos::BeforeStart);
    }

    #[test]
    fn take_children_extracts_subtree() {
        let mut seq = quoted();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(0);

        let captured = cursor.take_children();

        assert_eq!(captured.len(), 5);
        assert_eq!(captured[0].captured_content().as_deref(), Some("a"));
        assert_eq!(
            contents(cursor.sequence()),
            vec!["quote-enter", "quote-exit"]
        );
        assert_eq!(cursor.index(), Some(0));
    }

    #[test]
    fn take_children_then_splice_after_regenerates() {
        let mut seq = quoted();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(2); // the inner note pair
        let note = cursor.current_key().unwrap();

        let captured = cursor.take_children();
        assert_eq!(captured.len(), 1);

        // regenerate: keep the captured text, prefix a marker
        let mut regenerated = vec![Record::special("marker")];
        regenerated.extend(captured);
        cursor.splice_after(regenerated);

        assert_eq!(cursor.current_key(), Some(note));
        assert_eq!(
            contents(cursor.sequence()),
            vec![
                "quote-enter",
                "a",
                "note-enter",
                "marker-special",
                "b",
                "note-exit",
                "c",
                "quote-exit"
            ]
        );
    }

    #[test]
    fn take_children_keeps_keys() {
        let mut seq = quoted();
        let inner: Vec<_> = (1..6).map(|i| seq.key_at(i).unwrap()).collect();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(0);

        let captured = cursor.take_children();
        let keys: Vec<_> = captured.iter().map(Record::key).collect();
        assert_eq!(keys, inner);

        // splicing back restores the original stream, identity included
        let restored = cursor.splice_after(captured);
        assert_eq!(restored, inner);
    }

    #[test]
    fn take_children_on_unbalanced_pair_is_noop() {
        let mut seq = Sequence::from_records(vec![
            Record::enter("quote"),
            Record::text("a"),
        ]);
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(0);

        assert!(cursor.take_children().is_empty());
        assert_eq!(cursor.sequence().len(), 2);
    }

    #[test]
    fn take_children_requires_enter() {
        let mut seq = quoted();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(1);

        assert!(cursor.take_children().is_empty());
        assert_eq!(cursor.sequence().len(), 7);
    }

    #[test]
    fn remove_between_matches_take_children_count() {
        let mut captured = quoted();
        let mut cursor = Cursor::new(&mut captured);
        cursor.move_to_index(0);
        let captured_count = cursor.take_children().len();

        let mut removed = quoted();
        let open = removed.key_at(0).unwrap();
        let close = removed.key_at(6).unwrap();
        let mut cursor = Cursor::new(&mut removed);
        let removed_count = cursor.remove_between(open, close).unwrap();

        assert_eq!(removed_count, captured_count);
    }
}
