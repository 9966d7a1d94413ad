pub mod chatroom;
pub mod commands;
pub mod cut;
mod manager;

pub use manager::{Builtin, BuiltinSpec, BuiltinStatus, Handler, Scope, BUILTINS};
