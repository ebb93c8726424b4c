//! Command-line word splitting for the EAA harness
//!
//! The CLI under test is configured as a single command string such as
//! `python3 /opt/cli-eaa/bin/akamai-eaa`. This crate splits that string into
//! an argument vector using POSIX shell quoting rules, and quotes a vector
//! back into a string for logging. Nothing here ever runs a shell.

use eaa_core::{HarnessError, Span};
use logos::Logos;

/// Lexical pieces of a command string
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
pub enum Token {
    /// Unquoted run of characters, backslash escapes included; an escaped
    /// newline stays in the word as a literal newline
    #[regex(r#"([^ \t\r\n'"\\]|\\(.|\n))+"#)]
    Word,

    /// '...' with no escapes inside
    #[regex(r"'[^']*'")]
    SingleQuoted,

    /// "..." where only \" and \\ are escapes
    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleQuoted,

    /// Whitespace separates words (ignored)
    #[regex(r"[ \t\r\n]+", logos::skip)]
    Whitespace,

    /// End of input
    Eof,

    /// Lexer error
    Error,
}

/// Token with location information
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
    pub text: String,
}

impl SpannedToken {
    /// Text of the token with quoting and escapes removed
    #[must_use]
    pub fn unquoted(&self) -> String {
        match self.token {
            Token::SingleQuoted => self.text[1..self.text.len() - 1].to_string(),
            Token::DoubleQuoted => {
                unescape(&self.text[1..self.text.len() - 1], |escaped| {
                    matches!(escaped, '"' | '\\')
                })
            }
            Token::Word => unescape(&self.text, |_| true),
            _ => self.text.clone(),
        }
    }
}

/// Drop the backslash in front of every character `is_escape` accepts
fn unescape(text: &str, is_escape: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some(next) if is_escape(next) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Lexer that produces tokens with spans
pub struct Lexer<'input> {
    lexer: logos::Lexer<'input, Token>,
    input: &'input str,
}

impl<'input> Lexer<'input> {
    #[must_use]
    pub fn new(input: &'input str) -> Self {
        Self {
            lexer: Token::lexer(input),
            input,
        }
    }

    /// Get the next token with span information
    pub fn next_token(&mut self) -> SpannedToken {
        match self.lexer.next() {
            Some(result) => {
                let span = self.lexer.span();
                SpannedToken {
                    token: result.unwrap_or(Token::Error),
                    span: Span::new(span.start, span.end),
                    text: self.input[span].to_string(),
                }
            }
            None => SpannedToken {
                token: Token::Eof,
                span: Span::new(self.input.len(), self.input.len()),
                text: String::new(),
            },
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<SpannedToken> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.token == Token::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

/// Split a command string into words
///
/// Adjacent tokens with no whitespace between them form one word, so
/// `--name="two words"` yields a single argument.
///
/// # Errors
///
/// Returns `HarnessError::CommandSyntax` on an unterminated quote or a
/// trailing backslash
pub fn split(input: &str) -> Result<Vec<String>, HarnessError> {
    let mut words = Vec::new();
    let mut current: Option<String> = None;
    let mut last_end = None;

    for token in Lexer::new(input).tokenize() {
        match token.token {
            Token::Eof => break,
            Token::Error => {
                let message = match token.text.chars().next() {
                    Some('\'' | '"') => "unterminated quote",
                    Some('\\') => "no character after escape",
                    _ => "unexpected character",
                };
                return Err(HarnessError::CommandSyntax {
                    message: message.to_string(),
                    span: token.span,
                });
            }
            _ => {
                let piece = token.unquoted();
                if last_end == Some(token.span.start) {
                    if let Some(word) = current.as_mut() {
                        word.push_str(&piece);
                    }
                } else {
                    words.extend(current.replace(piece));
                }
                last_end = Some(token.span.end);
            }
        }
    }
    words.extend(current);

    Ok(words)
}

fn is_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "@%+=:,./_-".contains(ch)
}

/// Quote a single word so that `split` returns it unchanged
#[must_use]
pub fn quote(word: &str) -> String {
    if word.is_empty() {
        return "''".to_string();
    }
    if word.chars().all(is_safe) {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', r#"'"'"'"#))
}

/// Render an argument vector as a copy-pasteable command line
#[must_use]
pub fn join<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|word| quote(word.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
