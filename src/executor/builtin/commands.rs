use std::os::unix::process::CommandExt;
use argh::FromArgs;
use crate::ast::Command;
use crate::config::Config;
use crate::executor::PathResolver;
use super::manager::{parse_args, BuiltinStatus, BUILTINS};

#[derive(FromArgs)]
/// Change the working directory of the shell.
struct CdArgs {
    #[argh(positional)]
    /// target directory; defaults to $HOME.
    dir: Option<String>,
}

pub fn cd(cmd: &Command, config: &Config) -> BuiltinStatus {
    let args: CdArgs = match parse_args(cmd) {
        Ok(args) => args,
        Err(status) => return status,
    };
    let target = args
        .dir
        .or_else(|| std::env::var("HOME").ok())
        .unwrap_or_else(|| "/".to_string());

    match std::env::set_current_dir(&target) {
        Ok(()) => BuiltinStatus::Success,
        Err(e) => {
            eprintln!("-{}: cd: {}: {}", config.sysname, target, e);
            BuiltinStatus::Failure
        }
    }
}

#[derive(FromArgs)]
/// Leave the shell.
struct ExitArgs {
    #[argh(positional)]
    /// exit status, 0 when omitted.
    code: Option<i32>,
}

pub fn exit(cmd: &Command, config: &Config) -> BuiltinStatus {
    let args: ExitArgs = match parse_args(cmd) {
        Ok(args) => args,
        Err(status) => return status,
    };
    match args.code.unwrap_or(0) {
        code @ 0..=255 => BuiltinStatus::RequestExit(code),
        code => {
            eprintln!("-{}: exit: {}: status must be between 0 and 255", config.sysname, code);
            BuiltinStatus::Failure
        }
    }
}

pub fn help(_cmd: &Command, config: &Config) -> BuiltinStatus {
    println!("{} builtins:", config.sysname);
    for spec in BUILTINS {
        println!("  {}", spec.usage);
    }
    BuiltinStatus::Success
}

#[derive(FromArgs)]
/// Run a command N times in a row.
struct RepeatArgs {
    #[argh(positional)]
    /// how many times to run the command.
    count: i64,
    #[argh(positional)]
    /// program to run.
    program: String,
    #[argh(positional, greedy)]
    /// arguments passed to the program.
    args: Vec<String>,
}

pub fn repeat(cmd: &Command, config: &Config) -> BuiltinStatus {
    let args: RepeatArgs = match parse_args(cmd) {
        Ok(args) => args,
        Err(status) => return status,
    };
    if args.count <= 0 {
        eprintln!("-{}: repeat: N must be > 0", config.sysname);
        return BuiltinStatus::Failure;
    }

    let Some(path) = PathResolver::from_env().resolve(&args.program) else {
        eprintln!("-{}: {}: command not found", config.sysname, args.program);
        return BuiltinStatus::Failure;
    };

    for _ in 0..args.count {
        let status = std::process::Command::new(&path)
            .arg0(&args.program)
            .args(&args.args)
            .status();
        if let Err(e) = status {
            eprintln!("-{}: {}: {}", config.sysname, args.program, e);
            return BuiltinStatus::Failure;
        }
    }
    BuiltinStatus::Success
}
