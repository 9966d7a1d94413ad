use std::io::{self, Write};
use std::os::fd::OwnedFd;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, pipe2, ForkResult, Pid};
use tracing::{debug, warn};
use super::executor::{ExecError, FAILURE_STATUS};
use super::redirect::install;

/// Forks one child per stage and connects neighbours with pipes.
pub struct PipelineHandler<'a> {
    sysname: &'a str,
}

impl<'a> PipelineHandler<'a> {
    pub fn new(sysname: &'a str) -> Self {
        PipelineHandler { sysname }
    }

    /// Spawns every stage left to right and returns the child pids in
    /// stage order. `run` executes inside the child with fds 0 and 1
    /// already wired; its return value becomes the child's exit status.
    ///
    /// Pipe ends live in `OwnedFd`s created with `O_CLOEXEC`, so the
    /// parent holds no pipe descriptor once this returns, and a child
    /// that execs keeps only its own 0 and 1.
    pub fn spawn<T, F>(&self, stages: &[T], run: F) -> Result<Vec<Pid>, ExecError>
    where
        F: Fn(&T) -> i32,
    {
        // anything still buffered would be written twice after fork
        let _ = io::stdout().flush();

        let mut pids = Vec::with_capacity(stages.len());
        let mut prev_read: Option<OwnedFd> = None;

        for (i, stage) in stages.iter().enumerate() {
            let is_last = i + 1 == stages.len();
            let (next_read, write) = if is_last {
                (None, None)
            } else {
                match pipe2(OFlag::O_CLOEXEC) {
                    Ok((r, w)) => (Some(r), Some(w)),
                    Err(e) => {
                        warn!(stage = i, error = %e, "pipe failed");
                        drop(prev_read);
                        abandon(&pids);
                        return Err(ExecError::Pipe(e));
                    }
                }
            };

            // SAFETY: the interpreter is single threaded; the child only
            // rewires descriptors, runs the stage and `_exit`s.
            match unsafe { fork() } {
                Ok(ForkResult::Child) => {
                    drop(next_read);
                    // the Rust runtime ignores SIGPIPE and exec keeps ignored signals
                    let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };
                    let code = match wire(prev_read.take(), write) {
                        Ok(()) => run(stage),
                        Err(e) => {
                            child_diagnostic(&format!("-{}: {}\n", self.sysname, e));
                            FAILURE_STATUS
                        }
                    };
                    unsafe { libc::_exit(code) }
                }
                Ok(ForkResult::Parent { child }) => {
                    debug!(stage = i, pid = child.as_raw(), "forked stage");
                    pids.push(child);
                    drop(write);
                    prev_read = next_read;
                }
                Err(e) => {
                    warn!(stage = i, error = %e, "fork failed");
                    drop(write);
                    drop(next_read);
                    drop(prev_read);
                    abandon(&pids);
                    return Err(ExecError::Fork(e));
                }
            }
        }
        Ok(pids)
    }

    /// Waits for every pid and returns the status of the last one.
    /// A wait failure does not stop the remaining waits; the first one
    /// is reported after all children are gone.
    pub fn wait_all(pids: &[Pid]) -> Result<i32, ExecError> {
        let mut status = 0;
        let mut first_err = None;
        for &pid in pids {
            match wait_one(pid) {
                Ok(code) => status = code,
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(ExecError::Wait(e)),
            None => Ok(status),
        }
    }
}

fn wire(input: Option<OwnedFd>, output: Option<OwnedFd>) -> Result<(), ExecError> {
    if let Some(fd) = input {
        install(fd, libc::STDIN_FILENO)?;
    }
    if let Some(fd) = output {
        install(fd, libc::STDOUT_FILENO)?;
    }
    Ok(())
}

fn wait_one(pid: Pid) -> nix::Result<i32> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => {
                debug!(pid = pid.as_raw(), code, "reaped");
                return Ok(code);
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                debug!(pid = pid.as_raw(), ?signal, "reaped");
                return Ok(128 + signal as i32);
            }
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(e) => return Err(e),
        }
    }
}

// Children forked before a failure still have to be collected.
fn abandon(pids: &[Pid]) {
    for &pid in pids {
        let _ = wait_one(pid);
    }
}

/// Writes straight to fd 2, bypassing the std stderr lock. For use in a
/// forked child.
pub(crate) fn child_diagnostic(msg: &str) {
    let mut bytes = msg.as_bytes();
    while !bytes.is_empty() {
        let n = unsafe { libc::write(libc::STDERR_FILENO, bytes.as_ptr().cast(), bytes.len()) };
        if n < 0 {
            if Errno::last() == Errno::EINTR {
                continue;
            }
            return;
        }
        bytes = &bytes[n as usize..];
    }
}
