//! Balance checking for instruction sequences.
//!
//! Rewrite passes assume enter/exit pairs nest properly, but upstream
//! content can arrive broken. The checker reports every violation as data;
//! turning issues into user-facing diagnostics is the embedding
//! application's job.

use orihon_stream::{RecordKey, RecordState, Sequence};

/// A single well-formedness violation found by [`check_balance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceIssue {
    /// An exit record with no open enter of the same tag.
    UnmatchedExit {
        /// Key of the offending exit record.
        key: RecordKey,
        /// Its tag name.
        tag: String,
    },
    /// An enter record that is never closed.
    UnclosedEnter {
        /// Key of the offending enter record.
        key: RecordKey,
        /// Its tag name.
        tag: String,
    },
}

/// Scans the sequence once and reports every balance violation.
///
/// An open-tag stack tracks pending enters. An exit whose tag does not
/// match the innermost open enter is reported and left unconsumed, so one
/// stray exit does not cascade into misreporting the rest of the stream.
/// Enters still open at the end are reported in document order.
///
/// Special, text and stateless foreign records never participate.
pub fn check_balance(seq: &Sequence) -> Vec<BalanceIssue> {
    let mut issues = Vec::new();
    let mut open: Vec<(RecordKey, &str)> = Vec::new();

    for record in seq.iter() {
        match record.state() {
            RecordState::Enter => open.push((record.key(), record.tag_name())),
            RecordState::Exit => match open.last() {
                Some(&(_, tag)) if tag == record.tag_name() => {
                    open.pop();
                }
                _ => issues.push(BalanceIssue::UnmatchedExit {
                    key: record.key(),
                    tag: record.tag_name().to_string(),
                }),
            },
            _ => {}
        }
    }

    for (key, tag) in open {
        issues.push(BalanceIssue::UnclosedEnter {
            key,
            tag: tag.to_string(),
        });
    }
    issues
}

/// Returns true if the sequence has no balance violations.
pub fn is_balanced(seq: &Sequence) -> bool {
    check_balance(seq).is_empty()
}
