//! Tree-shaped navigation over the flat sequence.
//!
//! No auxiliary tree is ever built. Every lookup is a linear scan that keeps
//! an integer nesting level: enter records raise it, exit records lower it,
//! and the scan stops where the level says the structural relation holds.
//! Special records are zero-width tags; they count as sibling boundaries but
//! never change the level, in every scan direction.

use tracing::warn;

use orihon_stream::{RecordKey, RecordState, Span};

use crate::cursor::{Cursor, CursorPos};

impl Cursor<'_> {
    /// Moves from an enter record to its matching exit.
    ///
    /// Returns false with the cursor unchanged when the cursor is not on an
    /// enter record (precondition violation, logged) or when the stream ends
    /// before the pair closes (malformed stream, logged). A wrong record is
    /// never reported as the match.
    pub fn move_to_matching_close(&mut self) -> bool {
        let Some(idx) = self.require_state(RecordState::Enter, "move_to_matching_close") else {
            return false;
        };
        match self.scan_close_from(idx) {
            Some(close) => {
                self.pos = CursorPos::At(close);
                true
            }
            None => {
                warn!(
                    "No matching exit for '{}' at index {}: stream is unbalanced",
                    self.seq.get(idx).map_or("?", |r| r.tag_name()),
                    idx
                );
                false
            }
        }
    }

    /// Moves from an exit record to its matching enter.
    ///
    /// The mirror of [`Cursor::move_to_matching_close`]: a backward scan in
    /// which exits raise the level and enters lower it. An exit with no open
    /// enter reports false (malformed stream, logged), never an unrelated
    /// record.
    pub fn move_to_matching_open(&mut self) -> bool {
        let Some(idx) = self.require_state(RecordState::Exit, "move_to_matching_open") else {
            return false;
        };
        let mut level = 0u32;
        for i in (0..idx).rev() {
            match self.seq.get(i).map_or(RecordState::None, |r| r.state()) {
                RecordState::Exit => level += 1,
                RecordState::Enter => {
                    if level == 0 {
                        self.pos = CursorPos::At(i);
                        return true;
                    }
                    level -= 1;
                }
                _ => {}
            }
        }
        warn!(
            "No matching enter for '{}' at index {}: stream is unbalanced",
            self.seq.get(idx).map_or("?", |r| r.tag_name()),
            idx
        );
        false
    }

    /// Moves to the next sibling tag at the same nesting depth.
    ///
    /// The cursor must be on an enter or special record. Text and foreign
    /// leaves between siblings are skipped; reaching the enclosing exit (or
    /// the end of the stream) means there is no next sibling, reported as
    /// false with the cursor unchanged.
    pub fn move_to_next_sibling(&mut self) -> bool {
        let Some(idx) = self.require_tag("move_to_next_sibling") else {
            return false;
        };
        // standing on an enter, its own subtree must be skipped first
        let on_enter = self.seq.get(idx).is_some_and(|r| r.state() == RecordState::Enter);
        let mut level: i64 = if on_enter { 1 } else { 0 };
        for i in idx + 1..self.seq.len() {
            match self.seq.get(i).map_or(RecordState::None, |r| r.state()) {
                RecordState::Enter => {
                    if level == 0 {
                        self.pos = CursorPos::At(i);
                        return true;
                    }
                    level += 1;
                }
                RecordState::Exit => {
                    level -= 1;
                    if level < 0 {
                        return false;
                    }
                }
                RecordState::Special if level == 0 => {
                    self.pos = CursorPos::At(i);
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    /// Moves to the previous sibling tag at the same nesting depth.
    pub fn move_to_prev_sibling(&mut self) -> bool {
        let Some(idx) = self.require_tag("move_to_prev_sibling") else {
            return false;
        };
        let mut level: i64 = 0;
        for i in (0..idx).rev() {
            match self.seq.get(i).map_or(RecordState::None, |r| r.state()) {
                RecordState::Exit => level += 1,
                RecordState::Enter => {
                    level -= 1;
                    if level < 0 {
                        // nearest enclosing enter: the parent, not a sibling
                        return false;
                    }
                    if level == 0 {
                        self.pos = CursorPos::At(i);
                        return true;
                    }
                }
                RecordState::Special if level == 0 => {
                    self.pos = CursorPos::At(i);
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    /// Moves to the nearest enclosing enter record.
    ///
    /// From an exit the cursor first jumps to its matching enter, since a
    /// tag's parent is defined relative to its opening. Root records have no
    /// parent: false, cursor unchanged, no log.
    pub fn move_to_parent(&mut self) -> bool {
        let start = self.pos;
        let Some(record) = self.current() else {
            if !self.seq.is_empty() {
                warn!("move_to_parent at cursor sentinel: {:?}", self.pos);
            }
            return false;
        };
        if record.state() == RecordState::Exit && !self.move_to_matching_open() {
            return false;
        }
        let CursorPos::At(idx) = self.pos else {
            return false;
        };
        let mut level = 0u32;
        for i in (0..idx).rev() {
            match self.seq.get(i).map_or(RecordState::None, |r| r.state()) {
                RecordState::Exit => level += 1,
                RecordState::Enter => {
                    if level == 0 {
                        self.pos = CursorPos::At(i);
                        return true;
                    }
                    level -= 1;
                }
                _ => {}
            }
        }
        self.pos = start;
        false
    }

    /// Moves to the first child tag of the current enter record.
    ///
    /// The first enter or special record before the enter's own exit is the
    /// first child; text and foreign leaves are not children. An exit as the
    /// first tag-bearing record means the element has no child tags.
    pub fn move_to_first_child(&mut self) -> bool {
        let Some(idx) = self.require_state(RecordState::Enter, "move_to_first_child") else {
            return false;
        };
        for i in idx + 1..self.seq.len() {
            match self.seq.get(i).map_or(RecordState::None, |r| r.state()) {
                RecordState::Enter | RecordState::Special => {
                    self.pos = CursorPos::At(i);
                    return true;
                }
                RecordState::Exit => return false,
                _ => {}
            }
        }
        false
    }

    /// Collects the keys of the direct child tags of the current enter
    /// record, in document order. The cursor does not move.
    ///
    /// Nested grandchildren and interspersed text leaves are not counted;
    /// only enters and specials at the immediate nesting depth are.
    pub fn children(&self) -> Vec<RecordKey> {
        let Some(idx) = self.require_state(RecordState::Enter, "children") else {
            return Vec::new();
        };
        let mut keys = Vec::new();
        let mut level = 0u32;
        for i in idx + 1..self.seq.len() {
            let Some(record) = self.seq.get(i) else { break };
            match record.state() {
                RecordState::Enter => {
                    if level == 0 {
                        keys.push(record.key());
                    }
                    level += 1;
                }
                RecordState::Exit => {
                    if level == 0 {
                        break;
                    }
                    level -= 1;
                }
                RecordState::Special => {
                    if level == 0 {
                        keys.push(record.key());
                    }
                }
                _ => {}
            }
        }
        keys
    }

    /// Computes the source span covered by the current enter record and its
    /// matching exit.
    ///
    /// `None` when the cursor is not on an enter, the pair is unbalanced, or
    /// either record lacks a source position.
    pub fn pair_source_span(&self) -> Option<Span> {
        let CursorPos::At(idx) = self.pos else {
            return None;
        };
        let enter = self.seq.get(idx)?;
        if enter.state() != RecordState::Enter {
            return None;
        }
        let close = self.scan_close_from(idx)?;
        let start = enter.source_pos()?;
        let end = self.seq.get(close)?.source_pos()?;
        Some(Span::new(start, end))
    }

    /// Finds the index of the exit matching the enter at `idx` without
    /// moving the cursor. `None` on an unbalanced stream.
    pub(crate) fn scan_close_from(&self, idx: usize) -> Option<usize> {
        let mut level = 0u32;
        for i in idx + 1..self.seq.len() {
            match self.seq.get(i).map_or(RecordState::None, |r| r.state()) {
                RecordState::Enter => level += 1,
                RecordState::Exit => {
                    if level == 0 {
                        return Some(i);
                    }
                    level -= 1;
                }
                _ => {}
            }
        }
        None
    }

    /// Checks that the cursor is on a record in the given state, returning
    /// its index. Violations are precondition bugs in malformed content or
    /// calling code: logged, never fatal.
    fn require_state(&self, state: RecordState, op: &str) -> Option<usize> {
        let CursorPos::At(idx) = self.pos else {
            if !self.seq.is_empty() {
                warn!("{} at cursor sentinel: {:?}", op, self.pos);
            }
            return None;
        };
        let record = self.seq.get(idx)?;
        if record.state() == state {
            Some(idx)
        } else {
            warn!(
                "{} requires a {} record, cursor is on '{}' ({})",
                op,
                state,
                record.kind(),
                record.state()
            );
            None
        }
    }

    /// Like `require_state`, but accepts any sibling-boundary tag (enter or
    /// special).
    fn require_tag(&self, op: &str) -> Option<usize> {
        let CursorPos::At(idx) = self.pos else {
            if !self.seq.is_empty() {
                warn!("{} at cursor sentinel: {:?}", op, self.pos);
            }
            return None;
        };
        let record = self.seq.get(idx)?;
        if record.state().is_sibling_boundary() {
            Some(idx)
        } else {
            warn!(
                "{} requires an enter or special record, cursor is on '{}' ({})",
                op,
                record.kind(),
                record.state()
            );
            None
        }
    }
}
