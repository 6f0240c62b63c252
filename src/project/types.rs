/// Project type definitions
///
/// Records persisted by the admin workflow plus the typed inputs the form
/// layer hands to create/update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Logical blob-store folder for cover images
pub const COVER_IMAGE_FOLDER: &str = "project_image";

/// A portfolio project as stored in `projects`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Row identifier
    pub id: i64,
    /// Human-readable title (e.g., "Boolflix")
    pub title: String,
    /// URL-safe identifier derived from the title (e.g., "boolflix")
    pub slug: String,
    /// Free-form description
    pub content: Option<String>,
    /// Blob-store path of the cover image (e.g., "project_image/3f2a….png")
    pub cover_image: Option<String>,
    /// Optional category reference
    pub type_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shared technology tag (e.g., "Rust", "Vue")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Technology {
    pub id: i64,
    pub name: String,
}

/// Project category, read-only reference data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectType {
    pub id: i64,
    pub name: String,
}

/// Denormalized copy of a freshly created project, kept for notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Project together with its technology associations, for show/edit
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub technologies: Vec<Technology>,
}

/// An uploaded file as received from the form layer
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-side file name, used only for its extension
    pub file_name: Option<String>,
    /// Declared MIME type
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Lowercase alphanumeric extension taken from the client file name
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Validated data for creating a project
#[derive(Debug, Clone, Default)]
pub struct ProjectCreateInput {
    pub title: String,
    pub content: Option<String>,
    pub type_id: Option<i64>,
    pub technology_ids: Vec<i64>,
    pub cover_image: Option<UploadedFile>,
}

/// Validated data for updating a project
///
/// `technology_ids` is the complete new association set.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdateInput {
    pub title: String,
    pub content: Option<String>,
    pub type_id: Option<i64>,
    pub technology_ids: Vec<i64>,
    pub cover_image: Option<UploadedFile>,
}

impl From<ProjectCreateInput> for ProjectUpdateInput {
    fn from(input: ProjectCreateInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            type_id: input.type_id,
            technology_ids: input.technology_ids,
            cover_image: input.cover_image,
        }
    }
}

/// Column values written to `projects` on insert/update
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub title: String,
    pub slug: String,
    pub content: Option<String>,
    pub type_id: Option<i64>,
    /// `None` leaves the stored cover image untouched on update
    pub cover_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: Option<&str>) -> UploadedFile {
        UploadedFile {
            file_name: name.map(str::to_string),
            content_type: None,
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file(Some("Cover.PNG")).extension().as_deref(), Some("png"));
    }

    #[test]
    fn extension_rejects_odd_names() {
        assert_eq!(file(None).extension(), None);
        assert_eq!(file(Some("noext")).extension(), None);
        assert_eq!(file(Some("evil.p/ng")).extension(), None);
        assert_eq!(file(Some("trailing.")).extension(), None);
    }
}
