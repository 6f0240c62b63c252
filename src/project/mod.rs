/// Project management module
///
/// Records, persistence and the admin workflow for portfolio projects,
/// their technologies and the leads generated on creation.

pub mod database;
pub mod service;
pub mod slug;
pub mod storage;
pub mod types;

pub use database::Database;
pub use service::{ProjectError, ProjectWorkflow};
pub use storage::ProjectStorage;
pub use types::{Lead, Project, ProjectType, Technology};
