// terminal widget core for a portfolio page
// a fake shell over a handful of canned markdown files, plus a chat mode
// backed by a small in-browser language model
pub mod chat;
pub mod command;
pub mod commands;
pub mod config;
pub mod context;
pub mod display;
pub mod format;
pub mod interpreter;
pub mod style;
pub mod terminal;
pub mod vfs;
pub mod writer;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use chat::{BackendError, InferenceBackend, ProgressEvent, ProgressStatus};
pub use config::TerminalConfig;
pub use context::{Key, SessionMode};
pub use display::{Display, RecordingDisplay, StdoutDisplay};
pub use terminal::Terminal;
