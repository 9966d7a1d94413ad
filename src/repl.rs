use std::io::{self, BufRead, BufReader, IsTerminal};
use tracing::debug;
use crate::config::Config;
use crate::error::ShellError;
use crate::executor::{Executor, ExitDirective};
use crate::io::{InputHandler, InputLine, StdinReader};
use crate::parser::parse_input;
use crate::prompt::ShellPrompt;

pub struct Repl<E, R> {
    executor: E,
    input: InputHandler<R>,
    prompt: Option<ShellPrompt>,
    sysname: String,
}

impl<E: Executor> Repl<E, BufReader<StdinReader>> {
    /// Reads standard input; the prompt is shown only on a terminal.
    pub fn stdin(executor: E, config: &Config) -> Self {
        let prompt = io::stdin().is_terminal().then(|| ShellPrompt::new(config));
        Repl::new(executor, InputHandler::stdin(), prompt, config)
    }
}

impl<E: Executor, R: BufRead> Repl<E, R> {
    pub fn new(executor: E, input: InputHandler<R>, prompt: Option<ShellPrompt>, config: &Config) -> Self {
        Repl {
            executor,
            input,
            prompt,
            sysname: config.sysname.clone(),
        }
    }

    /// Runs until `exit` or end of input and returns the status to exit with.
    pub fn run(&mut self) -> Result<i32, ShellError> {
        loop {
            self.executor.reap();
            let prompt = self.prompt.as_ref().map(ShellPrompt::render);
            let line = match self.input.read_line(prompt.as_deref()) {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(self.executor.last_status()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    eprintln!("-{}: {}", self.sysname, e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let ExitDirective::Exit(code) = execute_line(&mut self.executor, &line, &self.sysname) {
                return Ok(code);
            }
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

/// Parses and runs one line, reporting failures on stderr. Nothing that
/// goes wrong here ends the loop; only `exit` does.
pub fn execute_line<E: Executor>(executor: &mut E, line: &InputLine, sysname: &str) -> ExitDirective {
    let pipeline = match parse_input(line) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("-{}: {}", sysname, ShellError::from(e));
            return ExitDirective::Continue;
        }
    };
    debug!(?pipeline, "parsed");
    if pipeline.auto_complete() {
        debug!(name = %pipeline.first().name, "completion requested; running as typed");
    }

    match executor.exec(&pipeline) {
        Ok(directive) => directive,
        Err(e) => {
            eprintln!("-{}: {}", sysname, ShellError::from(e));
            ExitDirective::Continue
        }
    }
}

/// `-c` mode: runs `text` once and returns the status to exit with.
pub fn run_once<E: Executor>(executor: &mut E, text: &str, sysname: &str) -> i32 {
    match execute_line(executor, &InputLine::new(text), sysname) {
        ExitDirective::Exit(code) => code,
        ExitDirective::Continue => executor.last_status(),
    }
}
