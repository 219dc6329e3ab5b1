//! CLI commands

mod apks;
mod completions;
mod credentials;
mod edit;
mod init;
mod publish;
mod targeting;

pub use apks::ApksCommand;
pub use completions::CompletionsCommand;
pub use credentials::CredentialArgs;
pub use edit::EditCommand;
pub use init::InitCommand;
pub use publish::PublishCommand;
pub use targeting::TargetingCommand;
