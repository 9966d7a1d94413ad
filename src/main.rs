use std::path::PathBuf;
use anyhow::Context;
use argh::FromArgs;
use tracing_subscriber::EnvFilter;
use shellish::config::{Config, ConfigLoader};
use shellish::executor::DefaultExecutor;
use shellish::repl::{self, Repl};

#[derive(FromArgs)]
/// A small interactive command interpreter with pipes and redirections.
struct Args {
    #[argh(option)]
    /// configuration file; defaults to ~/.shellishrc when present.
    config: Option<PathBuf>,
    #[argh(option, short = 'c')]
    /// run a single command line and exit with its status.
    command: Option<String>,
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_env("SHELLISH_LOG")
        .or_else(|_| EnvFilter::try_new(config.log.as_deref().unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    let config = ConfigLoader::load(args.config.as_deref()).with_context(|| match &args.config {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "failed to load ~/.shellishrc".to_string(),
    })?;
    init_logging(&config);

    let mut executor = DefaultExecutor::new(config.clone());
    let code = match args.command {
        Some(line) => repl::run_once(&mut executor, &line, &config.sysname),
        None => Repl::stdin(executor, &config).run()?,
    };
    std::process::exit(code);
}
