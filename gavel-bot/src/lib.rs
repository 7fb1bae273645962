pub mod event;
pub mod github;
pub mod settings;

pub use event::{CommentEvent, Invocation};
pub use github::GitHubClient;
pub use settings::Settings;
