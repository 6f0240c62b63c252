/// Portfolio admin: project management backend
///
/// This library provides the admin CRUD workflow for portfolio projects with
/// cover-image storage, technology tagging and lead notifications.

// Core configuration and setup
pub mod config;

// Project records, persistence and the admin workflow
pub mod project;

// Blob storage for uploaded cover images
pub mod blob;

// Outbound mail for lead notifications
pub mod mail;

// HTTP API layer - admin endpoints and form handling
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use project::{Lead, Project, ProjectError, ProjectWorkflow, Technology};
pub use server::{build_router, create_app, start_server};
