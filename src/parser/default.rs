use crate::ast::{Command, OutputMode, Pipeline};
use crate::lexer::Token;
use super::{ParseError, Parser};

pub struct DefaultParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> DefaultParser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self, pat: &Token) -> bool {
        if self.peek() == Some(pat) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Path glued to the operator, or else the following word.
    fn redirect_target(
        &mut self,
        glued: &Option<String>,
        operator: &'static str,
    ) -> Result<String, ParseError> {
        if let Some(path) = glued {
            return Ok(path.clone());
        }
        match self.peek() {
            Some(Token::Word(w)) => {
                self.pos += 1;
                Ok(w.clone())
            }
            _ => Err(ParseError::MissingRedirectTarget { operator }),
        }
    }
}

impl<'a> Parser for DefaultParser<'a> {
    fn parse(&mut self) -> Result<Pipeline, ParseError> {
        let mut stages = vec![self.parse_stage()?];
        while self.consume(&Token::Pipe) {
            stages.push(self.parse_stage()?);
        }

        if stages.len() > 1 {
            if let Some(index) = stages.iter().position(Command::is_empty) {
                return Err(ParseError::EmptyStage { index });
            }
        }
        Ok(Pipeline::new(stages))
    }
}

impl<'a> DefaultParser<'a> {
    // Everything up to the next `|` belongs to one stage.
    fn parse_stage(&mut self) -> Result<Command, ParseError> {
        let mut words: Vec<String> = Vec::new();
        let mut cmd = Command::default();

        loop {
            let tok = match self.peek() {
                None | Some(Token::Pipe) => break,
                Some(tok) => tok,
            };
            self.pos += 1;
            match tok {
                Token::Word(w) => words.push(w.clone()),
                // stray `&` mid-line; only a trailing one means background
                Token::Amp | Token::Pipe => {}
                Token::RedirectIn(glued) => {
                    cmd.redirect_in = Some(self.redirect_target(glued, "<")?);
                }
                Token::RedirectOut(glued) => {
                    cmd.redirect_out_truncate = Some(self.redirect_target(glued, ">")?);
                    cmd.last_output = Some(OutputMode::Truncate);
                }
                Token::RedirectAppend(glued) => {
                    cmd.redirect_out_append = Some(self.redirect_target(glued, ">>")?);
                    cmd.last_output = Some(OutputMode::Append);
                }
            }
        }

        cmd.name = words.first().cloned().unwrap_or_default();
        cmd.args = if words.is_empty() { vec![String::new()] } else { words };
        Ok(cmd)
    }
}
