use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use nix::unistd::{access, AccessFlags};

/// Maps a command name to an executable path.
///
/// Names containing `/` are checked as given; bare names are searched
/// for in each `PATH` directory in order. Resolution only reads the
/// environment, so it is safe to run in a freshly forked child.
pub struct PathResolver {
    search_path: Option<OsString>,
}

impl PathResolver {
    /// Reads `PATH` at each resolution.
    pub fn from_env() -> Self {
        PathResolver { search_path: None }
    }

    pub fn with_search_path(path: impl Into<OsString>) -> Self {
        PathResolver { search_path: Some(path.into()) }
    }

    pub fn resolve(&self, command: &str) -> Option<PathBuf> {
        if command.is_empty() {
            return None;
        }

        if command.contains('/') {
            let path = Path::new(command);
            return is_executable(path).then(|| path.to_path_buf());
        }

        let paths = match &self.search_path {
            Some(p) => p.clone(),
            None => env::var_os("PATH")?,
        };
        env::split_paths(&paths)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| dir.join(command))
            .find(|full_path| is_executable(full_path))
    }
}

fn is_executable(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}
