//! Lexer trait definition.

use crate::{LexError, Sequence};

/// Trait for lexing markup source into an instruction sequence.
///
/// Implementations convert raw markup text into the flat record sequence
/// the engine navigates and rewrites. The engine itself ships no grammar;
/// lexers are supplied by the embedding application.
///
/// # Example
///
/// ```rust
/// use orihon_stream::{Lexer, LexError, Record, Sequence};
///
/// struct PlainLexer;
///
/// impl Lexer for PlainLexer {
///     fn name(&self) -> &str {
///         "plain"
///     }
///
///     fn extensions(&self) -> &[&str] {
///         &["txt"]
///     }
///
///     fn lex(&self, source: &str) -> Result<Sequence, LexError> {
///         let mut seq = Sequence::new();
///         seq.push(Record::enter("p"));
///         seq.push(Record::text(source));
///         seq.push(Record::exit("p"));
///         Ok(seq)
///     }
/// }
///
/// let seq = PlainLexer.lex("hello").unwrap();
/// assert_eq!(seq.len(), 3);
/// assert!(PlainLexer.can_lex("TXT"));
/// ```
pub trait Lexer {
    /// Returns the name of this lexer.
    fn name(&self) -> &str;

    /// Returns the file extensions this lexer handles.
    ///
    /// Extensions should not include the leading dot (e.g., `["txt", "wiki"]`).
    fn extensions(&self) -> &[&str];

    /// Lexes the source text into an instruction sequence.
    fn lex(&self, source: &str) -> Result<Sequence, LexError>;

    /// Returns true if this lexer can handle the given file extension.
    fn can_lex(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
