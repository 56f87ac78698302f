//! 推拉编排命令

mod pull_command;
mod push_command;

pub use pull_command::{PullDocumentCommand, PullOutcome};
pub use push_command::{PushDocumentCommand, PushOutcome, PushParams, TargetRef};
