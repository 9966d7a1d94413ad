#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Plain argument, outer quotes already stripped.
    Word(String),
    Pipe,           // |
    Amp,            // stray &
    /// `<path`; `None` when the operator stood alone.
    RedirectIn(Option<String>),
    RedirectOut(Option<String>),    // >
    RedirectAppend(Option<String>), // >>
}
