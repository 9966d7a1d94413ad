use std::env;
use nix::unistd::{gethostname, getuid, User};
use crate::config::Config;

pub struct ShellPrompt {
    template: String,
    sysname: String,
}

impl ShellPrompt {
    pub fn new(config: &Config) -> Self {
        ShellPrompt {
            template: config.prompt.clone(),
            sysname: config.sysname.clone(),
        }
    }

    /// Expands `{user}`, `{host}`, `{cwd}` and `{sysname}` in the template.
    pub fn render(&self) -> String {
        self.render_with(&current_user(), &current_host(), &current_dir())
    }

    fn render_with(&self, user: &str, host: &str, cwd: &str) -> String {
        self.template
            .replace("{user}", user)
            .replace("{host}", host)
            .replace("{cwd}", cwd)
            .replace("{sysname}", &self.sysname)
    }
}

fn current_user() -> String {
    if let Ok(user) = env::var("USER") {
        return user;
    }
    match User::from_uid(getuid()) {
        Ok(Some(user)) => user.name,
        _ => "?".to_string(),
    }
}

fn current_host() -> String {
    gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}

fn current_dir() -> String {
    env::current_dir()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|_| "?".to_string())
}
