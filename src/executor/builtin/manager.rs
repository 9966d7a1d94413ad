use argh::{EarlyExit, FromArgs};
use crate::ast::Command;
use crate::config::Config;
use super::{chatroom, commands, cut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinStatus {
    Success,
    Failure,
    RequestExit(i32),
}

impl BuiltinStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            BuiltinStatus::Success => 0,
            BuiltinStatus::Failure => crate::executor::FAILURE_STATUS,
            BuiltinStatus::RequestExit(code) => code,
        }
    }
}

/// Where a builtin is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Mutates interpreter state; runs in the interpreter process.
    ProcessLocal,
    /// Only touches its own standard streams; may run in a forked child.
    PipelineSafe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Exit,
    Help,
    Cut,
    Repeat,
    Chatroom,
}

pub type Handler = fn(&Command, &Config) -> BuiltinStatus;

pub struct BuiltinSpec {
    pub id: Builtin,
    pub name: &'static str,
    pub scope: Scope,
    pub usage: &'static str,
    pub handler: Handler,
}

/// Indexed by `Builtin as usize`.
pub const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        id: Builtin::Cd,
        name: "cd",
        scope: Scope::ProcessLocal,
        usage: "cd [DIR]",
        handler: commands::cd,
    },
    BuiltinSpec {
        id: Builtin::Exit,
        name: "exit",
        scope: Scope::ProcessLocal,
        usage: "exit [CODE]",
        handler: commands::exit,
    },
    BuiltinSpec {
        id: Builtin::Help,
        name: "help",
        scope: Scope::PipelineSafe,
        usage: "help",
        handler: commands::help,
    },
    BuiltinSpec {
        id: Builtin::Cut,
        name: "cut",
        scope: Scope::PipelineSafe,
        usage: "cut -d X -f LIST   (or --delimiter/--fields)",
        handler: cut::cut,
    },
    BuiltinSpec {
        id: Builtin::Repeat,
        name: "repeat",
        scope: Scope::PipelineSafe,
        usage: "repeat N COMMAND [ARGS...]",
        handler: commands::repeat,
    },
    BuiltinSpec {
        id: Builtin::Chatroom,
        name: "chatroom",
        scope: Scope::PipelineSafe,
        usage: "chatroom ROOM USER",
        handler: chatroom::chatroom,
    },
];

impl Builtin {
    /// Exact name match only.
    pub fn lookup(name: &str) -> Option<Builtin> {
        BUILTINS.iter().find(|spec| spec.name == name).map(|spec| spec.id)
    }

    pub fn spec(self) -> &'static BuiltinSpec {
        &BUILTINS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn scope(self) -> Scope {
        self.spec().scope
    }

    pub fn run(self, cmd: &Command, config: &Config) -> BuiltinStatus {
        (self.spec().handler)(cmd, config)
    }
}

/// Parses a builtin's operands with argh. `--help` prints usage and
/// yields `Success`; bad arguments print the error and yield `Failure`.
pub(crate) fn parse_args<T: FromArgs>(cmd: &Command) -> Result<T, BuiltinStatus> {
    let args: Vec<&str> = cmd.operands().iter().map(String::as_str).collect();
    T::from_args(&[cmd.name.as_str()], &args).map_err(|EarlyExit { output, status }| match status {
        Ok(()) => {
            println!("{}", output);
            BuiltinStatus::Success
        }
        Err(()) => {
            eprintln!("{}", output);
            BuiltinStatus::Failure
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_id() {
        for (i, spec) in BUILTINS.iter().enumerate() {
            assert_eq!(spec.id as usize, i, "{} out of place", spec.name);
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(Builtin::lookup("cd"), Some(Builtin::Cd));
        assert_eq!(Builtin::lookup("chatroom"), Some(Builtin::Chatroom));
        assert_eq!(Builtin::lookup("c"), None);
        assert_eq!(Builtin::lookup("CD"), None);
        assert_eq!(Builtin::lookup("cut2"), None);
        assert_eq!(Builtin::lookup(""), None);
    }

    #[test]
    fn test_scopes() {
        assert_eq!(Builtin::Cd.scope(), Scope::ProcessLocal);
        assert_eq!(Builtin::Exit.scope(), Scope::ProcessLocal);
        for b in [Builtin::Help, Builtin::Cut, Builtin::Repeat, Builtin::Chatroom] {
            assert_eq!(b.scope(), Scope::PipelineSafe, "{}", b.name());
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BuiltinStatus::Success.exit_code(), 0);
        assert_ne!(BuiltinStatus::Failure.exit_code(), 0);
        assert_eq!(BuiltinStatus::RequestExit(3).exit_code(), 3);
    }

    #[test]
    fn test_exit_builtin_requests_exit() {
        let config = Config::default();
        let mut cmd = Command::new("exit");
        assert_eq!(Builtin::Exit.run(&cmd, &config), BuiltinStatus::RequestExit(0));
        cmd.args.push("4".into());
        assert_eq!(Builtin::Exit.run(&cmd, &config), BuiltinStatus::RequestExit(4));
    }
}
