use std::io::{BufRead, BufReader};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PROMPT: &str = "{user}@{host}:{cwd} {sysname}$ ";
pub const RC_FILE: &str = ".shellishrc";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Name used in diagnostics and the prompt.
    pub sysname: String,
    pub prompt: String,
    /// Parent directory of `chatroom-<room>` directories.
    pub chat_dir: PathBuf,
    /// tracing filter directive, e.g. `debug` or `shellish=trace`.
    pub log: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        ConfigLoader::default_config()
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> Config {
        Config {
            sysname: "shellish".to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            chat_dir: std::env::temp_dir(),
            log: None,
        }
    }

    /// `explicit` if given, else `$HOME/.shellishrc` when present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        let rc = std::env::var_os("HOME").map(|home| Path::new(&home).join(RC_FILE));
        match rc {
            Some(path) if path.is_file() => Self::load_from_file(&path),
            _ => Ok(Self::default_config()),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path).map_err(ConfigError::Io)?;
        let mut src = String::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(ConfigError::Io)?;
            src.push_str(&line);
            src.push('\n');
        }
        Self::load_from_str(&src)
    }

    pub fn load_from_str(src: &str) -> Result<Config, ConfigError> {
        let mut config = Self::default_config();

        for (lineno, line) in src.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse(format!("Line {}: No '=' found: {}", lineno + 1, line)));
            };
            let key = key.trim();
            match key {
                "sysname" => {
                    let value = value.trim();
                    if value.is_empty() {
                        return Err(ConfigError::Parse(format!("Line {}: sysname is empty", lineno + 1)));
                    }
                    config.sysname = value.to_string();
                }
                // keeps its surrounding blanks
                "prompt" => config.prompt = value.to_string(),
                "chat_dir" => config.chat_dir = PathBuf::from(value.trim()),
                "log" => config.log = Some(value.trim().to_string()),
                _ => return Err(ConfigError::Parse(format!("Line {}: Unknown key: {}", lineno + 1, key))),
            }
        }

        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}
