use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tracing::info;

/// Tracks the children of background pipelines and collects them
/// without blocking.
#[derive(Debug, Default)]
pub struct Reaper {
    jobs: Vec<Pid>,
}

impl Reaper {
    pub fn new() -> Self {
        Reaper::default()
    }

    pub fn adopt(&mut self, pids: Vec<Pid>) {
        info!(pids = ?pids, "running in background");
        self.jobs.extend(pids);
    }

    /// Polls every tracked pid once. Returns how many were collected.
    pub fn reap_finished(&mut self) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|&pid| match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(_, code)) => {
                info!(pid = pid.as_raw(), code, "background job done");
                false
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                info!(pid = pid.as_raw(), ?signal, "background job killed");
                false
            }
            Ok(_) | Err(Errno::EINTR) => true,
            // someone else already collected it
            Err(_) => false,
        });
        before - self.jobs.len()
    }

    pub fn pending(&self) -> usize {
        self.jobs.len()
    }
}
