mod executor;
mod default_executor;
mod path_resolver;
mod pipeline;
mod reaper;
mod redirect;
pub mod builtin;


pub use executor::{ExecError, ExecStatus, Executor, ExitDirective, FAILURE_STATUS, NOT_FOUND_STATUS};
pub use default_executor::DefaultExecutor;
pub use path_resolver::PathResolver;
pub use pipeline::PipelineHandler;
pub use reaper::Reaper;
pub use redirect::RedirectHandler;
