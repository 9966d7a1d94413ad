use std::io;
use thiserror::Error;
use crate::ast::Pipeline;

/// Exit status of a child whose program could not be found or started.
pub const NOT_FOUND_STATUS: i32 = 127;
/// Exit status for builtin and I/O failures.
pub const FAILURE_STATUS: i32 = 1;

/// What the interactive loop should do after a line ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDirective {
    Continue,
    Exit(i32),
}

pub type ExecStatus = Result<ExitDirective, ExecError>;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("pipe: {0}")]
    Pipe(#[source] nix::Error),
    #[error("fork: {0}")]
    Fork(#[source] nix::Error),
    #[error("wait: {0}")]
    Wait(#[source] nix::Error),
    #[error("{path}: {source}")]
    Redirect {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("dup2: {0}")]
    Rewire(#[source] nix::Error),
}

pub trait Executor {
    fn exec(&mut self, pipeline: &Pipeline) -> ExecStatus;

    /// Status of the most recent foreground pipeline.
    fn last_status(&self) -> i32;

    /// Collects finished background work, if the executor has any.
    fn reap(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    // Records what it was asked to run instead of forking.
    struct TestExecutor {
        pub log: Vec<String>,
    }

    impl Executor for TestExecutor {
        fn exec(&mut self, pipeline: &Pipeline) -> ExecStatus {
            for stage in pipeline.stages() {
                self.log.push(format!("command: {} {:?}", stage.name, stage.operands()));
            }
            if pipeline.background() {
                self.log.push("background".to_string());
            }
            Ok(ExitDirective::Continue)
        }

        fn last_status(&self) -> i32 {
            0
        }
    }

    #[test]
    fn test_executor_sees_stages_in_order() {
        let mut exec = TestExecutor { log: vec![] };
        let pipeline = parse_line("ls -l | grep foo &").unwrap();
        assert!(matches!(exec.exec(&pipeline), Ok(ExitDirective::Continue)));
        assert_eq!(
            exec.log,
            vec!["command: ls [\"-l\"]", "command: grep [\"foo\"]", "background"]
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ExecError::Redirect {
            path: "out.txt".into(),
            source: io::Error::from_raw_os_error(libc::EACCES),
        };
        assert!(err.to_string().starts_with("out.txt: "));
        assert_eq!(ExecError::Fork(nix::Error::EAGAIN).to_string(), format!("fork: {}", nix::Error::EAGAIN));
    }
}
