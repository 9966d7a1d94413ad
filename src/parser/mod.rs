pub mod default;

use thiserror::Error;
use crate::ast::Pipeline;
use crate::io::InputLine;
use crate::lexer::{LexError, Lexer};
use default::DefaultParser;

pub trait Parser {
    fn parse(&mut self) -> Result<Pipeline, ParseError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("Missing file name after '{operator}'")]
    MissingRedirectTarget { operator: &'static str },
    #[error("Empty command in pipeline stage {}", .index + 1)]
    EmptyStage { index: usize },
}

/// Parses a line whose trailing `&`/`?` flags were already split off.
pub fn parse_input(line: &InputLine) -> Result<Pipeline, ParseError> {
    let tokens = Lexer::new(&line.text).tokenize()?;
    let pipeline = DefaultParser::new(&tokens).parse()?;

    let mut stages = pipeline.stages().to_vec();
    if let Some(last) = stages.last_mut() {
        last.background = line.background;
        last.auto_complete = line.auto_complete;
    }
    Ok(Pipeline::new(stages))
}

/// Parses a raw line as typed.
pub fn parse_line(raw: &str) -> Result<Pipeline, ParseError> {
    parse_input(&InputLine::new(raw))
}
