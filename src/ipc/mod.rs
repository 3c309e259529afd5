//! Unix-socket IPC: the message-passing hosting shell for the pipeline.

pub mod client;
pub mod protocol;
pub mod server;

pub use protocol::{Command, Response};
pub use server::{CommandHandler, IpcServer};
