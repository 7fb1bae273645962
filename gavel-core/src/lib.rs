pub mod command;
pub mod config;
pub mod executor;
pub mod ops;
pub mod target;
pub mod template;

pub use command::{tokenize, Command};
pub use config::{ActionSet, ConfigDocument, LockReason, StringOrSeq};
pub use executor::execute;
pub use ops::IssueOps;
pub use target::{IssueState, TargetKind, TargetRef};
pub use template::{render, RenderContext};
