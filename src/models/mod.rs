// Data models (structs)
pub mod config;
pub mod job;
pub mod project;
pub mod queue;
pub mod settings;
pub mod ssh;

pub use config::*;
pub use job::*;
pub use project::*;
pub use queue::*;
pub use settings::*;
pub use ssh::*;
