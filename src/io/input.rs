use std::io::{self, BufRead, BufReader, Read, Write};

/// A command line as the line source hands it to the parser: trimmed,
/// newline-free, with a trailing `&` or `?` already turned into a flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputLine {
    pub text: String,
    pub background: bool,
    pub auto_complete: bool,
}

impl InputLine {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim_matches(|c| c == ' ' || c == '\t' || c == '\n' || c == '\r');
        let (text, background, auto_complete) = if let Some(rest) = trimmed.strip_suffix('&') {
            (rest, true, false)
        } else if let Some(rest) = trimmed.strip_suffix('?') {
            (rest, false, true)
        } else {
            (trimmed, false, false)
        };
        InputLine {
            text: text.trim_end().to_string(),
            background,
            auto_complete,
        }
    }
}

/// Reads fd 0 one byte at a time, so no input meant for a child process
/// is left sitting in this process's buffer.
pub struct StdinReader;

impl Read for StdinReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(1);
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), len) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }
}

pub struct InputHandler<R> {
    reader: R,
}

impl InputHandler<BufReader<StdinReader>> {
    pub fn stdin() -> Self {
        InputHandler::new(BufReader::with_capacity(1, StdinReader))
    }
}

impl<R: BufRead> InputHandler<R> {
    pub fn new(reader: R) -> Self {
        InputHandler { reader }
    }

    /// `Ok(None)` on end of input (e.g. Ctrl-D).
    pub fn read_line(&mut self, prompt: Option<&str>) -> io::Result<Option<InputLine>> {
        if let Some(prompt) = prompt {
            let mut out = io::stdout();
            write!(out, "{}", prompt)?;
            out.flush()?;
        }

        let mut buf = String::new();
        let bytes_read = self.reader.read_line(&mut buf)?;
        if bytes_read == 0 {
            if prompt.is_some() {
                println!();
            }
            return Ok(None);
        }
        Ok(Some(InputLine::new(&buf)))
    }
}
