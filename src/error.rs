use std::io;
use thiserror::Error;
use crate::executor::ExecError;
use crate::parser::ParseError;

/// Failures that reach the interactive loop. Lexing errors arrive wrapped
/// in `ParseError`; config errors stop startup before the loop exists.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Exec(#[from] ExecError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::LexError;

    fn fails_to_parse(line: &str) -> Result<(), ShellError> {
        crate::parser::parse_line(line)?;
        Ok(())
    }

    #[test]
    fn test_question_mark_converts() {
        let err = fails_to_parse("cat <").unwrap_err();
        assert!(matches!(err, ShellError::Parse(ParseError::MissingRedirectTarget { .. })));
        assert!(err.to_string().starts_with("parse error: "));
    }

    #[test]
    fn test_lex_errors_arrive_as_parse_errors() {
        let err = fails_to_parse("echo \"open").unwrap_err();
        assert!(matches!(
            err,
            ShellError::Parse(ParseError::Lex(LexError::UnterminatedQuote('"', 5)))
        ));
    }

    #[test]
    fn test_exec_message_is_not_prefixed() {
        let exec: ShellError = ExecError::Fork(nix::Error::EAGAIN).into();
        assert_eq!(exec.to_string(), format!("fork: {}", nix::Error::EAGAIN));
    }
}
