use thiserror::Error;
use super::token::Token;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LexError {
    #[error("Unterminated quote '{0}' starting at position {1}")]
    UnterminatedQuote(char, usize),
}

pub struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input }
    }

    pub fn tokenize(&self) -> Result<Vec<Token>, LexError> {
        Ok(self.raw_words()?.iter().map(|w| classify(w)).collect())
    }

    /// Splits on runs of blanks. A quoted run keeps its blanks and its quotes.
    fn raw_words(&self) -> Result<Vec<String>, LexError> {
        let mut words = Vec::new();
        let mut buf = String::new();
        let mut quote: Option<(char, usize)> = None;

        for (pos, ch) in self.input.char_indices() {
            match (quote, ch) {
                (Some((q, _)), c) if c == q => {
                    buf.push(c);
                    quote = None;
                }
                (Some(_), c) => buf.push(c),
                (None, ' ' | '\t' | '\n') => {
                    if !buf.is_empty() {
                        words.push(std::mem::take(&mut buf));
                    }
                }
                (None, c @ ('"' | '\'')) => {
                    buf.push(c);
                    quote = Some((c, pos));
                }
                (None, c) => buf.push(c),
            }
        }

        if let Some((q, pos)) = quote {
            return Err(LexError::UnterminatedQuote(q, pos));
        }
        if !buf.is_empty() {
            words.push(buf);
        }
        Ok(words)
    }
}

fn classify(raw: &str) -> Token {
    if raw == "|" {
        return Token::Pipe;
    }
    if raw == "&" {
        return Token::Amp;
    }
    if let Some(rest) = raw.strip_prefix(">>") {
        return Token::RedirectAppend(target(rest));
    }
    if let Some(rest) = raw.strip_prefix('>') {
        return Token::RedirectOut(target(rest));
    }
    if let Some(rest) = raw.strip_prefix('<') {
        return Token::RedirectIn(target(rest));
    }
    Token::Word(strip_quotes(raw).to_string())
}

fn target(rest: &str) -> Option<String> {
    let path = strip_quotes(rest);
    (!path.is_empty()).then(|| path.to_string())
}

/// Removes one layer of matching quotes from a token of 3+ characters.
pub fn strip_quotes(word: &str) -> &str {
    let bytes = word.as_bytes();
    if bytes.len() >= 3 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &word[1..word.len() - 1];
        }
    }
    word
}
