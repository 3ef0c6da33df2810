//! Instruction sequence storage.
//!
//! A sequence is the only owner of its records. Storage is a flat `Vec` in
//! document order together with a key index that maps stable record keys to
//! current positions; every splice keeps the index exact, so key lookups
//! stay O(1) while indices shift underneath.

use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Record, RecordKey, RecordState};

/// Ordered, splice-addressable storage for instruction records.
///
/// Exposes index-based primitives only; structural navigation and
/// cursor-relative editing live in the engine crate on top of these.
///
/// # Example
///
/// ```rust
/// use orihon_stream::{Record, Sequence};
///
/// let mut seq = Sequence::new();
/// seq.push(Record::enter("p"));
/// let text = seq.push(Record::text("hello"));
/// seq.push(Record::exit("p"));
///
/// assert_eq!(seq.len(), 3);
/// assert_eq!(seq.index_of(text), Some(1));
/// ```
#[derive(Debug, Default)]
pub struct Sequence {
    records: Vec<Record>,
    index: HashMap<RecordKey, usize>,
    next_key: u64,
}

impl Sequence {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a sequence from records in document order.
    ///
    /// Unset keys are stamped; stamped keys are kept unless they collide,
    /// in which case the collision is logged and re-stamped.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut seq = Self::new();
        seq.records.reserve(records.len());
        for record in records {
            seq.push(record);
        }
        seq
    }

    /// Returns the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the sequence holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the records as a slice in document order.
    #[inline]
    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Returns the record at the given index.
    pub fn get(&self, idx: usize) -> Option<&Record> {
        self.records.get(idx)
    }

    /// Returns the record at the given index mutably.
    ///
    /// Record mutators are shape-validated, so handing out the record
    /// cannot corrupt sequence bookkeeping; keys are not reachable through
    /// it.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Record> {
        self.records.get_mut(idx)
    }

    /// Returns the stable key of the record at the given index.
    pub fn key_at(&self, idx: usize) -> Option<RecordKey> {
        self.records.get(idx).map(Record::key)
    }

    /// Returns the current index of the record with the given key.
    ///
    /// This is the key-index lookup; [`Sequence::scan_for`] is the
    /// independent linear witness used by consistency checks.
    pub fn index_of(&self, key: RecordKey) -> Option<usize> {
        self.index.get(&key).copied()
    }

    /// Finds a key by scanning the records linearly.
    pub fn scan_for(&self, key: RecordKey) -> Option<usize> {
        self.records.iter().position(|record| record.key() == key)
    }

    /// Returns the record with the given key.
    pub fn by_key(&self, key: RecordKey) -> Option<&Record> {
        self.index_of(key).and_then(|idx| self.records.get(idx))
    }

    /// Returns the record with the given key mutably.
    pub fn by_key_mut(&mut self, key: RecordKey) -> Option<&mut Record> {
        let idx = self.index_of(key)?;
        self.records.get_mut(idx)
    }

    /// Appends a record, returning its stable key.
    pub fn push(&mut self, mut record: Record) -> RecordKey {
        let key = self.adopt(&mut record);
        self.index.insert(key, self.records.len());
        self.records.push(record);
        key
    }

    /// Inserts a record at the given index, returning its stable key.
    ///
    /// # Panics
    ///
    /// Panics if `idx > len`.
    pub fn insert_at(&mut self, idx: usize, mut record: Record) -> RecordKey {
        assert!(
            idx <= self.records.len(),
            "insert index {} out of range (len {})",
            idx,
            self.records.len()
        );
        let key = self.adopt(&mut record);
        self.records.insert(idx, record);
        self.reindex_from(idx);
        key
    }

    /// Inserts records at the given index, preserving their order.
    ///
    /// # Panics
    ///
    /// Panics if `idx > len`.
    pub fn splice_at(&mut self, idx: usize, records: Vec<Record>) -> Vec<RecordKey> {
        assert!(
            idx <= self.records.len(),
            "splice index {} out of range (len {})",
            idx,
            self.records.len()
        );
        let mut keys = Vec::with_capacity(records.len());
        let mut adopted = Vec::with_capacity(records.len());
        for mut record in records {
            keys.push(self.adopt(&mut record));
            adopted.push(record);
        }
        self.records.splice(idx..idx, adopted);
        self.reindex_from(idx);
        keys
    }

    /// Removes and returns the record at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= len`.
    pub fn remove_at(&mut self, idx: usize) -> Record {
        let record = self.records.remove(idx);
        self.index.remove(&record.key());
        self.reindex_from(idx);
        record
    }

    /// Removes and returns a contiguous run of records.
    ///
    /// The removed records keep their keys, so extracting a run and
    /// splicing it back later preserves identity.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or inverted.
    pub fn drain_span(&mut self, span: Range<usize>) -> Vec<Record> {
        let start = span.start;
        let removed: Vec<Record> = self.records.drain(span).collect();
        for record in &removed {
            self.index.remove(&record.key());
        }
        self.reindex_from(start);
        removed
    }

    /// Removes all records. Key minting stays monotonic across clears.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    /// Iterates over records in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Iterates over records together with their nesting depth.
    ///
    /// Enter records and their matching exits report the same depth; the
    /// records between them report one deeper. Depth can go negative on
    /// unbalanced streams.
    pub fn iter_depth(&self) -> DepthIter<'_> {
        DepthIter {
            inner: self.records.iter(),
            level: 0,
        }
    }

    /// Stamps the record's key if unset or colliding, and reserves it in
    /// the index. The caller overwrites the reserved slot with the real
    /// position.
    fn adopt(&mut self, record: &mut Record) -> RecordKey {
        let mut key = record.key();
        if key.is_unset() || self.index.contains_key(&key) {
            if !key.is_unset() {
                warn!("Re-stamping duplicate record key {}", key);
            }
            key = self.mint_key();
            record.set_key(key);
        }
        self.index.insert(key, usize::MAX);
        key
    }

    fn mint_key(&mut self) -> RecordKey {
        self.next_key += 1;
        RecordKey::from_raw(self.next_key)
    }

    fn reindex_from(&mut self, from: usize) {
        for i in from..self.records.len() {
            self.index.insert(self.records[i].key(), i);
        }
    }
}

impl Serialize for Sequence {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(&self.records)
    }
}

impl<'de> Deserialize<'de> for Sequence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<Record>::deserialize(deserializer).map(Sequence::from_records)
    }
}

/// Iterator yielding `(depth, record)` pairs, created by
/// [`Sequence::iter_depth`].
#[derive(Debug)]
pub struct DepthIter<'a> {
    inner: std::slice::Iter<'a, Record>,
    level: i32,
}

impl<'a> Iterator for DepthIter<'a> {
    type Item = (i32, &'a Record);

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.inner.next()?;
        match record.state() {
            RecordState::Enter => {
                let depth = self.level;
                self.level += 1;
                Some((depth, record))
            }
            RecordState::Exit => {
                self.level -= 1;
                Some((self.level, record))
            }
            _ => Some((self.level, record)),
        }
    }
}
