pub mod commands;
pub mod events;
pub mod types;

pub use commands::WorkerCommand;
pub use events::WorkerEvent;
pub use types::{Message, RequestKind, RequestToken, Sender};
