//! CLI commands

mod completions;
mod init;
mod inject;
mod release;
mod status;

pub use completions::CompletionsCommand;
pub use init::InitCommand;
pub use inject::InjectCommand;
pub use release::ReleaseCommand;
pub use status::StatusCommand;
