use std::fs::{File, OpenOptions};
use std::os::fd::{IntoRawFd, OwnedFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::unistd::{close, dup2};
use crate::ast::{Command, OutputMode};
use super::executor::ExecError;

pub struct RedirectHandler;

impl RedirectHandler {
    /// Applies a stage's own redirections on top of whatever the pipe
    /// wiring left on fds 0 and 1. Runs in the child only.
    ///
    /// Both output slots are honored in source order, so each file is
    /// created and the later one ends up owning stdout.
    pub fn apply(cmd: &Command) -> Result<(), ExecError> {
        if let Some(path) = &cmd.redirect_in {
            let file = File::open(path).map_err(|source| ExecError::Redirect {
                path: path.clone(),
                source,
            })?;
            install(file.into(), libc::STDIN_FILENO)?;
        }

        for (mode, path) in cmd.output_redirects() {
            let file = open_output(path, mode).map_err(|source| ExecError::Redirect {
                path: path.to_string(),
                source,
            })?;
            install(file.into(), libc::STDOUT_FILENO)?;
        }
        Ok(())
    }
}

fn open_output(path: &str, mode: OutputMode) -> std::io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).mode(0o644);
    match mode {
        OutputMode::Truncate => opts.truncate(true),
        OutputMode::Append => opts.append(true),
    };
    opts.open(path)
}

/// Moves `fd` onto `target` and closes the original.
pub(crate) fn install(fd: OwnedFd, target: RawFd) -> Result<(), ExecError> {
    let raw = fd.into_raw_fd();
    if raw == target {
        // already in place; just make sure it survives exec
        fcntl(raw, FcntlArg::F_SETFD(FdFlag::empty())).map_err(ExecError::Rewire)?;
        return Ok(());
    }
    let result = dup2(raw, target).map(drop).map_err(ExecError::Rewire);
    let _ = close(raw);
    result
}
