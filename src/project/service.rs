/// Project management workflow
///
/// Orchestrates one admin operation at a time: derives the slug, moves cover
/// images in and out of the blob store, writes through `ProjectStorage` and,
/// when leads are enabled, notifies the operator about new projects.

use crate::{
    blob::BlobStore,
    mail::{LeadMessage, Mailer},
    project::{
        slug::slugify_title,
        storage::ProjectStorage,
        types::{
            Lead, Project, ProjectCreateInput, ProjectDetail, ProjectRecord, ProjectType,
            ProjectUpdateInput, Technology, UploadedFile, COVER_IMAGE_FOLDER,
        },
    },
};
use serde::Serialize;
use std::sync::Arc;

/// Longest accepted title, in characters
pub const MAX_TITLE_CHARS: usize = 150;

/// Errors surfaced by workflow operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project {0} not found")]
    NotFound(i64),
    #[error("invalid project data: {0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type ProjectResult<T> = Result<T, ProjectError>;

/// Lead notification settings
#[derive(Debug, Clone)]
pub struct LeadSettings {
    /// Create a Lead and send mail for each new project
    pub enabled: bool,
    /// Fixed recipient of lead notifications
    pub operator_address: String,
    pub from_address: String,
}

/// `projects` bundle for the index view
#[derive(Debug, Serialize)]
pub struct ProjectIndex {
    pub projects: Vec<Project>,
}

/// `types` + `technologies` bundle for the create form
#[derive(Debug, Serialize)]
pub struct ProjectForm {
    pub types: Vec<ProjectType>,
    pub technologies: Vec<Technology>,
}

/// `project` + reference data bundle for the edit form
#[derive(Debug, Serialize)]
pub struct ProjectEditForm {
    pub project: ProjectDetail,
    pub types: Vec<ProjectType>,
    pub technologies: Vec<Technology>,
}

/// Result of a create
#[derive(Debug, Clone)]
pub struct CreatedProject {
    pub project: Project,
    pub lead: Option<Lead>,
}

/// The admin CRUD workflow over projects
#[derive(Debug, Clone)]
pub struct ProjectWorkflow {
    storage: ProjectStorage,
    blobs: Arc<dyn BlobStore>,
    mailer: Arc<dyn Mailer>,
    leads: LeadSettings,
}

/// Title, slug and content after trimming and checks
struct CleanFields {
    title: String,
    slug: String,
    content: Option<String>,
}

impl ProjectWorkflow {
    pub fn new(
        storage: ProjectStorage,
        blobs: Arc<dyn BlobStore>,
        mailer: Arc<dyn Mailer>,
        leads: LeadSettings,
    ) -> Self {
        Self {
            storage,
            blobs,
            mailer,
            leads,
        }
    }

    /// List every project
    pub async fn list(&self) -> ProjectResult<ProjectIndex> {
        let projects = self.storage.list_projects().await?;
        Ok(ProjectIndex { projects })
    }

    /// Reference data for the create form
    pub async fn create_form(&self) -> ProjectResult<ProjectForm> {
        Ok(ProjectForm {
            types: self.storage.list_types().await?,
            technologies: self.storage.list_technologies().await?,
        })
    }

    /// One project with its technologies
    pub async fn show(&self, id: i64) -> ProjectResult<ProjectDetail> {
        self.storage
            .find_project_detail(id)
            .await?
            .ok_or(ProjectError::NotFound(id))
    }

    /// One project plus reference data for the edit form
    pub async fn edit_form(&self, id: i64) -> ProjectResult<ProjectEditForm> {
        let project = self.show(id).await?;
        Ok(ProjectEditForm {
            project,
            types: self.storage.list_types().await?,
            technologies: self.storage.list_technologies().await?,
        })
    }

    /// Create a project, storing its cover image and attaching technologies
    pub async fn create(&self, input: ProjectCreateInput) -> ProjectResult<CreatedProject> {
        let fields = clean_fields(&input.title, input.content.as_deref())?;
        self.check_references(input.type_id, &input.technology_ids).await?;

        let cover_image = self.store_cover(input.cover_image.as_ref()).await?;

        let record = ProjectRecord {
            title: fields.title,
            slug: fields.slug,
            content: fields.content,
            type_id: input.type_id,
            cover_image: cover_image.clone(),
        };

        let created = self
            .storage
            .create_project(&record, &input.technology_ids, self.leads.enabled)
            .await;
        let (project, lead) = match created {
            Ok(created) => created,
            Err(e) => {
                if let Some(path) = &cover_image {
                    self.discard_blob(path).await;
                }
                return Err(e.into());
            }
        };

        tracing::info!("✨ Created project {} ({})", project.id, project.slug);

        if let Some(lead) = &lead {
            self.notify(lead).await;
        }

        Ok(CreatedProject { project, lead })
    }

    /// Overwrite a project and sync its technologies to exactly the submitted set
    ///
    /// A newly uploaded cover image replaces the stored one; the previous file
    /// is removed once the new record is committed.
    pub async fn update(&self, id: i64, input: ProjectUpdateInput) -> ProjectResult<Project> {
        if self.storage.find_project(id).await?.is_none() {
            return Err(ProjectError::NotFound(id));
        }

        let fields = clean_fields(&input.title, input.content.as_deref())?;
        self.check_references(input.type_id, &input.technology_ids).await?;

        let cover_image = self.store_cover(input.cover_image.as_ref()).await?;

        let record = ProjectRecord {
            title: fields.title,
            slug: fields.slug,
            content: fields.content,
            type_id: input.type_id,
            cover_image: cover_image.clone(),
        };

        let updated = match self
            .storage
            .update_project(id, &record, &input.technology_ids)
            .await
        {
            Ok(Some(updated)) => updated,
            outcome => {
                if let Some(path) = &cover_image {
                    self.discard_blob(path).await;
                }
                return match outcome {
                    Err(e) => Err(e.into()),
                    _ => Err(ProjectError::NotFound(id)),
                };
            }
        };

        if let Some(old) = &updated.replaced_cover_image {
            self.discard_blob(old).await;
        }

        tracing::info!("🔄 Updated project {} ({})", id, updated.project.slug);

        Ok(updated.project)
    }

    /// Delete a project together with its join rows and cover image
    pub async fn delete(&self, id: i64) -> ProjectResult<Project> {
        let project = self
            .storage
            .delete_project(id)
            .await?
            .ok_or(ProjectError::NotFound(id))?;

        if let Some(path) = &project.cover_image {
            self.discard_blob(path).await;
        }

        tracing::info!("🗑️ Deleted project {} ({})", project.id, project.slug);

        Ok(project)
    }

    /// Every lead generated so far
    pub async fn leads(&self) -> ProjectResult<Vec<Lead>> {
        Ok(self.storage.list_leads().await?)
    }

    async fn check_references(&self, type_id: Option<i64>, technology_ids: &[i64]) -> ProjectResult<()> {
        if let Some(type_id) = type_id {
            if !self.storage.type_exists(type_id).await? {
                return Err(ProjectError::Validation(format!("unknown type id {}", type_id)));
            }
        }

        let missing = self.storage.missing_technology_ids(technology_ids).await?;
        if !missing.is_empty() {
            let ids: Vec<String> = missing.iter().map(|id| id.to_string()).collect();
            return Err(ProjectError::Validation(format!(
                "unknown technology ids: {}",
                ids.join(", ")
            )));
        }

        Ok(())
    }

    async fn store_cover(&self, file: Option<&UploadedFile>) -> ProjectResult<Option<String>> {
        let Some(file) = file else {
            return Ok(None);
        };
        if let Some(content_type) = file.content_type.as_deref() {
            if !content_type.starts_with("image/") {
                return Err(ProjectError::Validation(format!(
                    "cover image must be an image, got {}",
                    content_type
                )));
            }
        }
        let path = self.blobs.put(COVER_IMAGE_FOLDER, file).await?;
        Ok(Some(path))
    }

    /// Best-effort blob removal; failures are logged
    async fn discard_blob(&self, path: &str) {
        if let Err(e) = self.blobs.delete(path).await {
            tracing::error!("❌ Failed to remove blob {}: {}", path, e);
        }
    }

    /// Mail the operator about a new lead; failures are logged
    async fn notify(&self, lead: &Lead) {
        let message =
            LeadMessage::for_lead(lead, &self.leads.operator_address, &self.leads.from_address);
        match self.mailer.send(&message).await {
            Ok(()) => tracing::debug!("📧 Lead {} notification sent", lead.id),
            Err(e) => tracing::error!("❌ Failed to send lead {} notification: {}", lead.id, e),
        }
    }
}

fn clean_fields(title: &str, content: Option<&str>) -> ProjectResult<CleanFields> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ProjectError::Validation("title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ProjectError::Validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }

    let slug = slugify_title(title);
    if slug.is_empty() {
        return Err(ProjectError::Validation(
            "title must contain at least one letter or digit".to_string(),
        ));
    }

    let content = content
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Ok(CleanFields {
        title: title.to_string(),
        slug,
        content,
    })
}
