//! Cursor positioning and structural edits.
//!
//! The cursor is the only mutation path into a sequence during a rewrite
//! pass. Every edit leaves it at a defined position, so scan loops survive
//! the splices they perform themselves.

use tracing::{debug, error, warn};

use orihon_stream::{Record, RecordKey, Sequence};

/// Cursor position within a sequence.
///
/// The sentinel states are distinct on purpose: a cursor before the start
/// is not on record zero and a cursor past the end is not on the last
/// record. [`Cursor::current`] is `None` at both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPos {
    /// Before the first record.
    BeforeStart,
    /// On the record at this index.
    At(usize),
    /// Past the last record.
    PastEnd,
}

/// Mutating cursor over a [`Sequence`].
///
/// The cursor exclusively borrows its sequence, so a second simultaneous
/// mutating cursor is a compile error; read-only passes between rewrite
/// phases use [`Sequence`] iterators directly.
///
/// A fresh cursor starts past the end. [`Cursor::move_to_start`] followed
/// by repeated [`Cursor::move_next`] is the canonical forward walk, and the
/// mirror holds for backward walks.
///
/// # Example
///
/// ```rust
/// use orihon_engine::Cursor;
/// use orihon_stream::{Record, Sequence};
///
/// let mut seq = Sequence::from_records(vec![
///     Record::enter("p"),
///     Record::text("hi"),
///     Record::exit("p"),
/// ]);
///
/// let mut cursor = Cursor::new(&mut seq);
/// cursor.move_to_start();
/// let mut kinds = Vec::new();
/// while cursor.move_next() {
///     kinds.push(cursor.current().unwrap().kind().to_string());
/// }
/// assert_eq!(kinds, vec!["p", "text", "p"]);
/// ```
pub struct Cursor<'a> {
    pub(crate) seq: &'a mut Sequence,
    pub(crate) pos: CursorPos,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over the sequence, positioned past the end.
    pub fn new(seq: &'a mut Sequence) -> Self {
        Self {
            seq,
            pos: CursorPos::PastEnd,
        }
    }

    /// Returns the current position.
    #[inline]
    pub const fn pos(&self) -> CursorPos {
        self.pos
    }

    /// Returns the current index, `None` at the sentinels.
    #[inline]
    pub const fn index(&self) -> Option<usize> {
        match self.pos {
            CursorPos::At(idx) => Some(idx),
            _ => None,
        }
    }

    /// Returns a read-only view of the underlying sequence.
    #[inline]
    pub fn sequence(&self) -> &Sequence {
        self.seq
    }

    /// Returns the current record, `None` at the sentinels.
    pub fn current(&self) -> Option<&Record> {
        match self.pos {
            CursorPos::At(idx) => self.seq.get(idx),
            _ => None,
        }
    }

    /// Returns the current record mutably, `None` at the sentinels.
    pub fn current_mut(&mut self) -> Option<&mut Record> {
        match self.pos {
            CursorPos::At(idx) => self.seq.get_mut(idx),
            _ => None,
        }
    }

    /// Returns the stable key of the current record.
    pub fn current_key(&self) -> Option<RecordKey> {
        self.current().map(Record::key)
    }

    /// Resets the cursor to before the first record.
    pub fn move_to_start(&mut self) {
        self.pos = CursorPos::BeforeStart;
    }

    /// Resets the cursor to past the last record.
    pub fn move_to_end(&mut self) {
        self.pos = CursorPos::PastEnd;
    }

    /// Steps forward. Returns true if the cursor is now on a record.
    ///
    /// Advancing past the last record parks the cursor at the past-end
    /// sentinel; further calls stay there.
    pub fn move_next(&mut self) -> bool {
        self.pos = match self.pos {
            CursorPos::BeforeStart => {
                if self.seq.is_empty() {
                    CursorPos::PastEnd
                } else {
                    CursorPos::At(0)
                }
            }
            CursorPos::At(idx) => {
                if idx + 1 < self.seq.len() {
                    CursorPos::At(idx + 1)
                } else {
                    CursorPos::PastEnd
                }
            }
            CursorPos::PastEnd => CursorPos::PastEnd,
        };
        matches!(self.pos, CursorPos::At(_))
    }

    /// Steps backward. Returns true if the cursor is now on a record.
    pub fn move_prev(&mut self) -> bool {
        self.pos = match self.pos {
            CursorPos::PastEnd => {
                if self.seq.is_empty() {
                    CursorPos::BeforeStart
                } else {
                    CursorPos::At(self.seq.len() - 1)
                }
            }
            CursorPos::At(idx) => {
                if idx > 0 {
                    CursorPos::At(idx - 1)
                } else {
                    CursorPos::BeforeStart
                }
            }
            CursorPos::BeforeStart => CursorPos::BeforeStart,
        };
        matches!(self.pos, CursorPos::At(_))
    }

    /// Repositions onto the record at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= len`; supplying an out-of-range index is a bug in
    /// the calling code, not a property of the stream.
    pub fn move_to_index(&mut self, idx: usize) {
        assert!(
            idx < self.seq.len(),
            "record index {} out of range (len {})",
            idx,
            self.seq.len()
        );
        self.pos = CursorPos::At(idx);
    }

    /// Repositions onto the record with the given stable key.
    ///
    /// Returns false (cursor unchanged) if no record carries the key, which
    /// is the normal outcome for a stale key. Disagreement between the key
    /// index and a linear scan is an internal error: it is logged, escalated
    /// in debug builds and repaired by trusting the scan.
    pub fn move_to_key(&mut self, key: RecordKey) -> bool {
        match self.locate(key) {
            Some(idx) => {
                self.pos = CursorPos::At(idx);
                true
            }
            None => false,
        }
    }

    /// Resolves a key to its index, verifying the key index against the
    /// record actually stored there.
    pub(crate) fn locate(&self, key: RecordKey) -> Option<usize> {
        match self.seq.index_of(key) {
            Some(idx) if self.seq.key_at(idx) == Some(key) => Some(idx),
            hint => {
                let found = self.seq.scan_for(key);
                if let Some(idx) = found {
                    error!(
                        "Key index inconsistent for key {}: hint={:?}, scan={}",
                        key, hint, idx
                    );
                    debug_assert!(false, "key index out of sync for key {key}");
                } else if hint.is_some() {
                    error!("Key index holds stale entry for key {}", key);
                    debug_assert!(false, "stale key index entry for key {key}");
                }
                found
            }
        }
    }

    /// Inserts a record before the current position, returning its key.
    ///
    /// On a record, the cursor keeps pointing at that record (its index
    /// shifts by one). Past the end, the record is appended; before the
    /// start, it becomes the new head. The sentinels are kept.
    pub fn insert_before(&mut self, record: Record) -> RecordKey {
        match self.pos {
            CursorPos::At(idx) => {
                let key = self.seq.insert_at(idx, record);
                self.pos = CursorPos::At(idx + 1);
                key
            }
            CursorPos::PastEnd => self.seq.push(record),
            CursorPos::BeforeStart => self.seq.insert_at(0, record),
        }
    }

    /// Inserts a record after the current position, returning its key.
    ///
    /// On a record, the cursor stays on that record. The sentinel behavior
    /// matches [`Cursor::insert_before`].
    pub fn insert_after(&mut self, record: Record) -> RecordKey {
        match self.pos {
            CursorPos::At(idx) => self.seq.insert_at(idx + 1, record),
            CursorPos::PastEnd => self.seq.push(record),
            CursorPos::BeforeStart => self.seq.insert_at(0, record),
        }
    }

    /// Inserts records before the current position, preserving their order.
    pub fn splice_before(&mut self, records: Vec<Record>) -> Vec<RecordKey> {
        let count = records.len();
        match self.pos {
            CursorPos::At(idx) => {
                let keys = self.seq.splice_at(idx, records);
                self.pos = CursorPos::At(idx + count);
                keys
            }
            CursorPos::PastEnd => self.seq.splice_at(self.seq.len(), records),
            CursorPos::BeforeStart => self.seq.splice_at(0, records),
        }
    }

    /// Inserts records after the current position, preserving their order.
    pub fn splice_after(&mut self, records: Vec<Record>) -> Vec<RecordKey> {
        match self.pos {
            CursorPos::At(idx) => self.seq.splice_at(idx + 1, records),
            CursorPos::PastEnd => self.seq.splice_at(self.seq.len(), records),
            CursorPos::BeforeStart => self.seq.splice_at(0, records),
        }
    }

    /// Removes the current record and steps back one position.
    ///
    /// If the record sliding into the freed index is a text record whose
    /// content is empty or whitespace-only, it is removed as well; deleting
    /// a tag otherwise tends to leave an orphaned blank between its former
    /// neighbors. The cursor ends one position before the deletion point,
    /// so a forward scan continues cleanly with [`Cursor::move_next`].
    ///
    /// Returns the number of records removed: 0 at a sentinel (logged),
    /// otherwise 1 or 2.
    pub fn remove_current(&mut self) -> usize {
        let CursorPos::At(idx) = self.pos else {
            warn!("remove_current at cursor sentinel: {:?}", self.pos);
            return 0;
        };
        let removed_record = self.seq.remove_at(idx);
        debug!(
            "Removed record at {}: kind={}",
            idx,
            removed_record.kind()
        );
        let mut removed = 1;

        let blank_follower = self.seq.get(idx).is_some_and(|follower| {
            follower.has_text_content()
                && follower
                    .captured_content()
                    .is_some_and(|content| content.trim().is_empty())
        });
        if blank_follower {
            self.seq.remove_at(idx);
            removed += 1;
        }

        self.pos = if idx == 0 {
            CursorPos::BeforeStart
        } else {
            CursorPos::At(idx - 1)
        };
        removed
    }
}

#[cfg(test)]
mod tests {
    use orihon_stream::{Record, RecordState};
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Sequence {
        Sequence::from_records(vec![
            Record::enter("p"),
            Record::text("one"),
            Record::text("two"),
            Record::exit("p"),
        ])
    }

    fn kinds(seq: &Sequence) -> Vec<String> {
        seq.iter()
            .map(|r| match r.state() {
                RecordState::Unmatched => r
                    .captured_content()
                    .map(|c| c.into_owned())
                    .unwrap_or_default(),
                state => format!("{}-{}", r.tag_name(), state),
            })
            .collect()
    }

    #[test]
    fn new_cursor_is_past_end() {
        let mut seq = sample();
        let cursor = Cursor::new(&mut seq);
        assert_eq!(cursor.pos(), CursorPos::PastEnd);
        assert!(cursor.current().is_none());
        assert_eq!(cursor.index(), None);
    }

    #[test]
    fn forward_walk_visits_every_record_once() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_start();

        let mut visited = Vec::new();
        while cursor.move_next() {
            visited.push(cursor.index().unwrap());
        }

        assert_eq!(visited, vec![0, 1, 2, 3]);
        assert_eq!(cursor.pos(), CursorPos::PastEnd);
        assert!(!cursor.move_next());
    }

    #[test]
    fn backward_walk_visits_every_record_once() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);

        let mut visited = Vec::new();
        while cursor.move_prev() {
            visited.push(cursor.index().unwrap());
        }

        assert_eq!(visited, vec![3, 2, 1, 0]);
        assert_eq!(cursor.pos(), CursorPos::BeforeStart);
        assert!(!cursor.move_prev());
    }

    #[test]
    fn empty_sequence_flips_between_sentinels() {
        let mut seq = Sequence::new();
        let mut cursor = Cursor::new(&mut seq);

        assert!(!cursor.move_prev());
        assert_eq!(cursor.pos(), CursorPos::BeforeStart);
        assert!(!cursor.move_next());
        assert_eq!(cursor.pos(), CursorPos::PastEnd);
        assert!(cursor.current().is_none());
    }

    #[test]
    fn move_to_index_lands_on_record() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(2);
        assert_eq!(
            cursor.current().unwrap().captured_content().as_deref(),
            Some("two")
        );
    }

    #[test]
    #[should_panic(expected = "record index")]
    fn move_to_index_out_of_range_panics() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(4);
    }

    #[test]
    fn move_to_key_survives_index_shifts() {
        let mut seq = sample();
        let key = seq.key_at(2).unwrap();
        let mut cursor = Cursor::new(&mut seq);

        // shift everything right of the head
        cursor.move_to_index(0);
        cursor.insert_before(Record::special("linebreak"));
        cursor.insert_before(Record::special("linebreak"));

        assert!(cursor.move_to_key(key));
        assert_eq!(cursor.index(), Some(4));
        assert_eq!(
            cursor.current().unwrap().captured_content().as_deref(),
            Some("two")
        );
    }

    #[test]
    fn move_to_key_stale_is_false_and_keeps_position() {
        let mut seq = sample();
        let key = seq.key_at(1).unwrap();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(1);
        cursor.remove_current();

        let before = cursor.pos();
        assert!(!cursor.move_to_key(key));
        assert_eq!(cursor.pos(), before);
    }

    #[test]
    fn insert_before_keeps_cursor_on_original_record() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(1);
        let original = cursor.current_key().unwrap();

        let inserted = cursor.insert_before(Record::special("linebreak"));

        assert_eq!(cursor.index(), Some(2));
        assert_eq!(cursor.current_key(), Some(original));
        // stepping back lands on the inserted record
        assert!(cursor.move_prev());
        assert_eq!(cursor.current_key(), Some(inserted));
    }

    #[test]
    fn insert_before_past_end_appends() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);

        cursor.insert_before(Record::special("hr"));

        assert_eq!(cursor.pos(), CursorPos::PastEnd);
        assert_eq!(cursor.sequence().len(), 5);
        assert_eq!(cursor.sequence().get(4).unwrap().tag_name(), "hr");
    }

    #[test]
    fn insert_before_before_start_prepends() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_start();

        cursor.insert_before(Record::special("hr"));

        assert_eq!(cursor.pos(), CursorPos::BeforeStart);
        assert_eq!(cursor.sequence().get(0).unwrap().tag_name(), "hr");
    }

    #[test]
    fn insert_after_keeps_position() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(1);
        let original = cursor.current_key().unwrap();

        let inserted = cursor.insert_after(Record::special("linebreak"));

        assert_eq!(cursor.index(), Some(1));
        assert_eq!(cursor.current_key(), Some(original));
        assert!(cursor.move_next());
        assert_eq!(cursor.current_key(), Some(inserted));
    }

    #[test]
    fn splice_after_preserves_order() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(0);

        cursor.splice_after(vec![Record::text("a"), Record::text("b")]);

        assert_eq!(cursor.index(), Some(0));
        assert_eq!(
            kinds(cursor.sequence()),
            vec!["p-enter", "a", "b", "one", "two", "p-exit"]
        );
    }

    #[test]
    fn splice_before_keeps_cursor_on_original_record() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(3);

        cursor.splice_before(vec![Record::text("a"), Record::text("b")]);

        assert_eq!(cursor.index(), Some(5));
        assert_eq!(cursor.current().unwrap().state(), RecordState::Exit);
    }

    #[test]
    fn remove_current_steps_back() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(2);

        let removed = cursor.remove_current();

        assert_eq!(removed, 1);
        assert_eq!(cursor.index(), Some(1));
        // the forward scan resumes with the record that followed
        assert!(cursor.move_next());
        assert_eq!(cursor.current().unwrap().state(), RecordState::Exit);
    }

    #[test]
    fn remove_current_takes_blank_follower() {
        let mut seq = Sequence::from_records(vec![
            Record::enter("p"),
            Record::special("hr"),
            Record::text("   \n"),
            Record::text("kept"),
            Record::exit("p"),
        ]);
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(1);

        let removed = cursor.remove_current();

        assert_eq!(removed, 2);
        assert_eq!(cursor.index(), Some(0));
        assert_eq!(kinds(cursor.sequence()), vec!["p-enter", "kept", "p-exit"]);
    }

    #[test]
    fn remove_current_keeps_nonblank_follower() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(1);

        let removed = cursor.remove_current();

        assert_eq!(removed, 1);
        assert_eq!(kinds(cursor.sequence()), vec!["p-enter", "two", "p-exit"]);
    }

    #[test]
    fn remove_current_keeps_tag_follower() {
        let mut seq = Sequence::from_records(vec![
            Record::text("x"),
            Record::special("hr"),
            Record::text("y"),
        ]);
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(0);

        let removed = cursor.remove_current();

        assert_eq!(removed, 1);
        assert_eq!(cursor.pos(), CursorPos::BeforeStart);
        assert_eq!(cursor.sequence().len(), 2);
    }

    #[test]
    fn remove_current_at_head_parks_before_start() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(0);

        cursor.remove_current();

        assert_eq!(cursor.pos(), CursorPos::BeforeStart);
        // move_next resumes on the record that followed the deleted one
        assert!(cursor.move_next());
        assert_eq!(
            cursor.current().unwrap().captured_content().as_deref(),
            Some("one")
        );
    }

    #[test]
    fn remove_current_at_sentinel_is_noop() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);

        assert_eq!(cursor.remove_current(), 0);
        assert_eq!(cursor.sequence().len(), 4);
        assert_eq!(cursor.pos(), CursorPos::PastEnd);
    }

    #[test]
    fn current_mut_edits_record_in_place() {
        let mut seq = sample();
        let mut cursor = Cursor::new(&mut seq);
        cursor.move_to_index(0);

        assert!(cursor.current_mut().unwrap().set_attr("class", "lede"));
        assert_eq!(cursor.current().unwrap().attr("class"), Some("lede"));
    }
}
