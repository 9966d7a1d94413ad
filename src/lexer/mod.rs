mod lexer;
mod token;

pub use lexer::{Lexer, LexError, strip_quotes};
pub use token::Token;
