/// HTTP API Layer
///
/// This module provides the admin endpoints for project management. It handles:
/// - Project CRUD (list, forms, create, show, update, delete)
/// - Multipart form decoding into typed inputs
/// - Flash messages across the post/redirect/get cycle

// Admin project endpoints
pub mod projects;

// Multipart form decoding
pub mod form;

// Flash cookie handling
pub mod flash;

// Re-export router builder
pub use projects::{create_project_routes, AppState};
