pub mod input;

pub use input::{InputHandler, InputLine, StdinReader};
