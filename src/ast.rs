/// Which output redirection slot a token filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Truncate,
    Append,
}

/// One pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    pub name: String,
    /// argv, `args[0] == name`. Never empty.
    pub args: Vec<String>,
    pub redirect_in: Option<String>,
    pub redirect_out_truncate: Option<String>,
    pub redirect_out_append: Option<String>,
    /// Output slot parsed last; it owns stdout when both are set.
    pub last_output: Option<OutputMode>,
    pub background: bool,
    pub auto_complete: bool,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Command {
            name: name.to_string(),
            args: vec![name.to_string()],
            ..Default::default()
        }
    }

    /// The no-op sentinel produced by an empty line.
    pub fn empty() -> Self {
        Command::new("")
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Arguments after argv[0].
    pub fn operands(&self) -> &[String] {
        self.args.get(1..).unwrap_or(&[])
    }

    /// Output redirections in the order they have to be applied.
    pub fn output_redirects(&self) -> Vec<(OutputMode, &str)> {
        let truncate = self
            .redirect_out_truncate
            .as_deref()
            .map(|p| (OutputMode::Truncate, p));
        let append = self
            .redirect_out_append
            .as_deref()
            .map(|p| (OutputMode::Append, p));
        let ordered = match self.last_output {
            Some(OutputMode::Truncate) => [append, truncate],
            _ => [truncate, append],
        };
        ordered.into_iter().flatten().collect()
    }
}

/// An ordered chain of stages connected by pipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Command>,
}

impl Pipeline {
    /// An empty vector becomes the no-op pipeline.
    pub fn new(stages: Vec<Command>) -> Self {
        if stages.is_empty() {
            return Pipeline { stages: vec![Command::empty()] };
        }
        Pipeline { stages }
    }

    pub fn single(cmd: Command) -> Self {
        Pipeline { stages: vec![cmd] }
    }

    pub fn stages(&self) -> &[Command] {
        &self.stages
    }

    pub fn first(&self) -> &Command {
        &self.stages[0]
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_single(&self) -> bool {
        self.stages.len() == 1
    }

    /// Only the terminal stage's request counts.
    pub fn background(&self) -> bool {
        self.stages.last().is_some_and(|c| c.background)
    }

    pub fn auto_complete(&self) -> bool {
        self.stages.last().is_some_and(|c| c.auto_complete)
    }

    /// True for the empty-line sentinel.
    pub fn is_noop(&self) -> bool {
        self.is_single() && self.first().is_empty()
    }
}
