//
// lexer.rs
// The MDSE REST Compiler
//

//! This module contains type definitions and functions for
//! breaking up unstructured source text into lexemes and tokens.
//! The same token set serves all three model grammars.

use regex::Regex;
use crate::error::{ Error, Result };
use crate::util::{ grapheme_count, grapheme_count_by };

pub use crate::util::{ Location, Range, Ranged };


/// Given an array of source strings, returns an array of tokens
/// extracted from those strings, or an error if there is a lexical
/// error in any of the source strings.
///
/// # Arguments
///
/// * `sources`: a slice of `str`-convertible source strings.
///
/// # Return value
///
/// * `Ok(Vec<Token>)` if the sources were lexically correct.
/// * `Err(Error::Syntax)` if there was a lexical error in the input.
pub fn lex<S: AsRef<str>>(sources: &[S]) -> Result<Vec<Token>> {
    Lexer::new()?.lex(sources)
}

/// Lexes the sources and drops whitespace and comments,
/// which is what every parser entry point expects.
pub fn lex_significant<S: AsRef<str>>(sources: &[S]) -> Result<Vec<Token>> {
    let mut tokens = lex(sources)?;
    tokens.retain(Token::is_significant);
    Ok(tokens)
}

/// Describes the type of a single token or lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    /// Horizontal and vertical (e.g. newline) whitespace. Unicode-aware.
    Whitespace,
    /// A line comment, beginning with '#' and ending with vertical whitespace or end-of-source.
    Comment,
    /// An identifier or a keyword.
    Word,
    /// An unquoted URL path template such as `/productos/{id}`.
    Path,
    /// Braces, brackets, colons and commas.
    Punctuation,
    /// String literal.
    String,
    /// Unsigned decimal integer literal.
    Numeric,
}

/// Represents a lexeme and its associated type and location information as an abstract token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token<'a> {
    /// The kind associated with the recognized lexeme.
    pub kind: TokenKind,
    /// A pointer into the source where the underlying lexeme was found.
    pub value: &'a str,
    /// Human-readable range information for the underlying lexeme.
    pub range: Range,
}

impl<'a> Token<'a> {
    /// Returns `false` for whitespace and comments.
    pub fn is_significant(&self) -> bool {
        match self.kind {
            TokenKind::Whitespace => false,
            TokenKind::Comment    => false,
            _                     => true,
        }
    }
}

impl<'a> Ranged for Token<'a> {
    fn range(&self) -> Range {
        self.range
    }
}

trait LocationExt {
    fn advance_by(&self, lexeme: &str) -> Location;
}

impl LocationExt for Location {
    fn advance_by(&self, lexeme: &str) -> Location {
        // Keep this list in sync with the regexes in Lexer::new()
        let line_breaks: &[char] = &['\n', '\x0b', '\x0c', '\r', '\u{0085}', '\u{2028}', '\u{2029}'];
        match lexeme.rfind(line_breaks) {
            // -1 because the \n itself doesn't count,
            // +1 because humans start counting at 1.
            Some(index) => Location {
                src_idx: self.src_idx,
                line:    self.line + grapheme_count_by(lexeme, |g| g.contains(line_breaks)),
                column:  grapheme_count(&lexeme[index..]) - 1 + 1,
            },
            None => Location {
                src_idx: self.src_idx,
                line:    self.line,
                column:  self.column + grapheme_count(lexeme),
            },
        }
    }
}

const NUM_TOKEN_KINDS: usize = 7;

#[derive(Debug)]
struct Lexer<'a> {
    source: &'a str,
    location: Location,
    tokens: Vec<Token<'a>>,
    regexes: [(TokenKind, Regex); NUM_TOKEN_KINDS],
}

impl<'a> Lexer<'a> {
    fn new() -> Result<Lexer<'a>> {
        let segment = r#"(\{[_\p{XID_Start}]\p{XID_Continue}*\}|[\-\.\p{XID_Continue}]+)"#;
        let path = format!(r#"^(/{})+"#, segment);

        Ok(Lexer {
            source: "",
            location: Default::default(),
            tokens: Vec::new(),
            regexes: [
                (TokenKind::Whitespace,  compile(r#"^\s+"#)?),
                (TokenKind::Comment,     compile(r#"^#[^\n\v\f\r\x{0085}\x{2028}\x{2029}]*(\r\n|[\n\v\f\r\x{0085}\x{2028}\x{2029}])?"#)?),
                (TokenKind::Word,        compile(r#"^[_\p{XID_Start}]\p{XID_Continue}*"#)?),
                (TokenKind::Numeric,     compile(r#"^[0-9]+"#)?),
                (TokenKind::Path,        compile(&path)?),
                (TokenKind::Punctuation, compile(r#"^[\{\}\[\]:,]"#)?),
                (TokenKind::String,      compile(r#"^"([^\\"\n]|\\[\\"nrt])*""#)?),
            ],
        })
    }

    fn lex<S: AsRef<str>>(mut self, sources: &'a [S]) -> Result<Vec<Token<'a>>> {
        for source in sources {
            self.source = source.as_ref();
            self.location.line = 1;
            self.location.column = 1;
            self.lex_single_source()?;
            self.location.src_idx += 1;
        }

        Ok(self.tokens)
    }

    fn lex_single_source(&mut self) -> Result<()> {
        while let Some(token) = self.next_token()? {
            self.tokens.push(token);
        }

        Ok(())
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>> {
        if self.source.is_empty() {
            return Ok(None)
        }

        for &(kind, ref re) in &self.regexes {
            if let Some(m) = re.find(self.source) {
                let value = m.as_str();
                let start = self.location;
                let end   = self.location.advance_by(value);
                let range = Range { start, end };
                let token = Token { kind, value, range };

                self.location = end;
                self.source = &self.source[m.end()..];

                return Ok(Some(token));
            }
        }

        // Only report the offending character, not the rest of the source
        let bad_char = self.source.chars().next().map_or("", |c| &self.source[..c.len_utf8()]);

        Err(Error::Syntax {
            message: format!("Invalid token '{}'", bad_char),
            range: Range {
                start: self.location,
                end: self.location.advance_by(bad_char),
            },
        })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|error| unreachable_error!(
        format!("invalid token regex {}: {}", pattern, error)
    ))
}

/// Renders `value` as a string literal that lexes back to a single
/// `TokenKind::String` token and unescapes to `value` again.
pub fn quote(value: &str) -> String {
    let mut buf = String::with_capacity(value.len() + 2);

    buf.push('"');

    for ch in value.chars() {
        match ch {
            '\\' => buf.push_str("\\\\"),
            '"'  => buf.push_str("\\\""),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            _    => buf.push(ch),
        }
    }

    buf.push('"');
    buf
}

/// Unescapes a string literal lexeme and strips delimiting quotes.
/// Keep the escapes in sync with the String regex in `Lexer::new()`.
pub fn unquote(lexeme: &str, range: Range) -> Result<String> {
    if !lexeme.starts_with('"') || !lexeme.ends_with('"') || lexeme.len() < 2 {
        bug!("Missing leading or trailing \" in string at {}", range)
    }

    let mut chars = lexeme[1..lexeme.len() - 1].chars();
    let mut buf = String::with_capacity(lexeme.len());
    let unterm_err = lazy_bug!("Unterminated escape sequence in string at {}", range);

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next().ok_or_else(&unterm_err)? {
                '\\' => buf.push('\\'),
                '"'  => buf.push('"'),
                'n'  => buf.push('\n'),
                'r'  => buf.push('\r'),
                't'  => buf.push('\t'),
                esc  => bug!("Invalid escape \\{} in string at {}", esc, range),
            }
        } else {
            buf.push(ch);
        }
    }

    Ok(buf)
}
