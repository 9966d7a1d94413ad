use std::ffi::{CString, NulError};
use std::io::{self, Write};
use std::os::unix::ffi::OsStringExt;
use std::path::PathBuf;
use nix::unistd::execv;
use tracing::debug;
use crate::ast::{Command, Pipeline};
use crate::config::Config;
use super::builtin::{Builtin, BuiltinStatus, Scope};
use super::executor::{
    ExecStatus, Executor, ExitDirective, FAILURE_STATUS, NOT_FOUND_STATUS,
};
use super::path_resolver::PathResolver;
use super::pipeline::{child_diagnostic, PipelineHandler};
use super::reaper::Reaper;
use super::redirect::RedirectHandler;

pub struct DefaultExecutor {
    config: Config,
    resolver: PathResolver,
    reaper: Reaper,
    last_status: i32,
}

// What a stage will do once forked. Everything that allocates or can
// fail in a reportable way is settled here, in the parent.
enum Program {
    Builtin(Builtin),
    External { path: CString, argv: Vec<CString> },
    NotFound(String),
    BadArgument(String),
}

struct StagePlan<'a> {
    cmd: &'a Command,
    program: Program,
}

impl DefaultExecutor {
    pub fn new(config: Config) -> Self {
        DefaultExecutor {
            config,
            resolver: PathResolver::from_env(),
            reaper: Reaper::new(),
            last_status: 0,
        }
    }

    pub fn with_resolver(mut self, resolver: PathResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn background_jobs(&self) -> usize {
        self.reaper.pending()
    }

    fn plan<'a>(&self, cmd: &'a Command) -> StagePlan<'a> {
        let sysname = &self.config.sysname;
        let program = if let Some(builtin) = Builtin::lookup(&cmd.name) {
            Program::Builtin(builtin)
        } else {
            match self.resolver.resolve(&cmd.name) {
                None => Program::NotFound(format!("-{}: {}: command not found\n", sysname, cmd.name)),
                Some(path) => match exec_args(path, &cmd.args) {
                    Ok((path, argv)) => Program::External { path, argv },
                    Err(_) => Program::BadArgument(format!(
                        "-{}: {}: argument contains a NUL byte\n",
                        sysname, cmd.name
                    )),
                },
            }
        };
        StagePlan { cmd, program }
    }

    fn run_local(&mut self, builtin: Builtin, cmd: &Command) -> ExitDirective {
        let status = builtin.run(cmd, &self.config);
        self.last_status = status.exit_code();
        match status {
            BuiltinStatus::RequestExit(code) => ExitDirective::Exit(code),
            _ => ExitDirective::Continue,
        }
    }
}

impl Executor for DefaultExecutor {
    fn exec(&mut self, pipeline: &Pipeline) -> ExecStatus {
        self.reaper.reap_finished();
        if pipeline.is_noop() {
            return Ok(ExitDirective::Continue);
        }

        if pipeline.is_single() {
            let cmd = pipeline.first();
            if let Some(builtin) = Builtin::lookup(&cmd.name) {
                if builtin.scope() == Scope::ProcessLocal {
                    debug!(builtin = builtin.name(), "running in-process");
                    return Ok(self.run_local(builtin, cmd));
                }
            }
        }

        let plans: Vec<StagePlan> = pipeline.stages().iter().map(|cmd| self.plan(cmd)).collect();
        let config = &self.config;
        let pids = PipelineHandler::new(&config.sysname).spawn(&plans, |plan| run_planned(plan, config))?;

        if pipeline.background() {
            self.reaper.adopt(pids);
            self.last_status = 0;
        } else {
            self.last_status = PipelineHandler::wait_all(&pids)?;
            debug!(status = self.last_status, "pipeline finished");
        }
        Ok(ExitDirective::Continue)
    }

    fn last_status(&self) -> i32 {
        self.last_status
    }

    fn reap(&mut self) {
        self.reaper.reap_finished();
    }
}

fn exec_args(path: PathBuf, args: &[String]) -> Result<(CString, Vec<CString>), NulError> {
    let path = CString::new(path.into_os_string().into_vec())?;
    let argv = args
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((path, argv))
}

// Child side of one stage. Returns the exit status when it does not exec.
fn run_planned(plan: &StagePlan, config: &Config) -> i32 {
    if let Err(e) = RedirectHandler::apply(plan.cmd) {
        child_diagnostic(&format!("-{}: {}\n", config.sysname, e));
        return FAILURE_STATUS;
    }

    match &plan.program {
        Program::Builtin(builtin) => {
            let code = builtin.run(plan.cmd, config).exit_code();
            let _ = io::stdout().flush();
            code
        }
        Program::External { path, argv } => {
            let err = match execv(path, argv) {
                Ok(never) => match never {},
                Err(e) => e,
            };
            child_diagnostic(&format!("-{}: {}: {}\n", config.sysname, plan.cmd.name, err.desc()));
            NOT_FOUND_STATUS
        }
        Program::NotFound(msg) => {
            child_diagnostic(msg);
            NOT_FOUND_STATUS
        }
        Program::BadArgument(msg) => {
            child_diagnostic(msg);
            FAILURE_STATUS
        }
    }
}
