/// SQLite persistence layer for projects
///
/// Handles project CRUD, reference-data reads, lead records and the
/// project ↔ technology join relation. Every write touching a project and its
/// join rows runs inside one transaction.

use crate::project::{
    slug::first_free_slug,
    types::{Lead, Project, ProjectDetail, ProjectRecord, ProjectType, Technology},
};
use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use std::collections::BTreeSet;

/// Write transactions take the write lock at BEGIN; concurrent writers wait on
/// the busy timeout.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

const PROJECT_COLUMNS: &str =
    "id, title, slug, content, cover_image, type_id, created_at, updated_at";

/// SQLite-backed project storage
#[derive(Debug, Clone)]
pub struct ProjectStorage {
    pool: SqlitePool,
}

/// Outcome of a successful update
#[derive(Debug, Clone)]
pub struct UpdatedProject {
    pub project: Project,
    /// Blob path that was recorded before this update and is no longer referenced
    pub replaced_cover_image: Option<String>,
}

impl ProjectStorage {
    /// Create new storage instance with database connection
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All projects, oldest first
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects ORDER BY id",
            PROJECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    /// Retrieve a project by ID
    pub async fn find_project(&self, id: i64) -> Result<Option<Project>> {
        let mut conn = self.pool.acquire().await?;
        fetch_project(&mut conn, id).await
    }

    /// Retrieve a project together with its technologies
    pub async fn find_project_detail(&self, id: i64) -> Result<Option<ProjectDetail>> {
        let Some(project) = self.find_project(id).await? else {
            return Ok(None);
        };
        let technologies = self.project_technologies(id).await?;
        Ok(Some(ProjectDetail { project, technologies }))
    }

    /// Technologies currently associated with a project, by name
    pub async fn project_technologies(&self, project_id: i64) -> Result<Vec<Technology>> {
        let technologies = sqlx::query_as::<_, Technology>(
            r#"
            SELECT t.id, t.name
            FROM technologies t
            JOIN project_technology pt ON pt.technology_id = t.id
            WHERE pt.project_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(technologies)
    }

    /// All technologies (reference data)
    pub async fn list_technologies(&self) -> Result<Vec<Technology>> {
        let technologies =
            sqlx::query_as::<_, Technology>("SELECT id, name FROM technologies ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(technologies)
    }

    /// All project types (reference data)
    pub async fn list_types(&self) -> Result<Vec<ProjectType>> {
        let types = sqlx::query_as::<_, ProjectType>("SELECT id, name FROM types ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    /// Whether a type with this ID exists
    pub async fn type_exists(&self, id: i64) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM types WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// IDs from `ids` that name no technology, sorted
    pub async fn missing_technology_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        let mut missing = Vec::new();
        for id in ids.iter().copied().collect::<BTreeSet<_>>() {
            let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM technologies WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            if row.is_none() {
                missing.push(id);
            }
        }
        Ok(missing)
    }

    /// Insert a project, attach its technologies and optionally record a lead
    ///
    /// The stored slug is `record.slug` or its first free numbered variant.
    pub async fn create_project(
        &self,
        record: &ProjectRecord,
        technology_ids: &[i64],
        with_lead: bool,
    ) -> Result<(Project, Option<Lead>)> {
        let now = Utc::now();
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;

        let slug = free_slug(&mut tx, &record.slug, None).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO projects (title, slug, content, cover_image, type_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.title)
        .bind(&slug)
        .bind(&record.content)
        .bind(&record.cover_image)
        .bind(record.type_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        attach_technologies(&mut tx, id, technology_ids).await?;

        let project = fetch_project(&mut tx, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Project {} vanished after insert", id))?;

        let lead = if with_lead {
            Some(insert_lead(&mut tx, &project).await?)
        } else {
            None
        };

        tx.commit().await?;

        tracing::debug!("💾 Inserted project {} ({})", project.id, project.slug);

        Ok((project, lead))
    }

    /// Overwrite a project's fields and sync its technologies to exactly `technology_ids`
    ///
    /// Returns `None` when the project does not exist. A `None` cover image in
    /// `record` keeps the stored one.
    pub async fn update_project(
        &self,
        id: i64,
        record: &ProjectRecord,
        technology_ids: &[i64],
    ) -> Result<Option<UpdatedProject>> {
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;

        let Some(existing) = fetch_project(&mut tx, id).await? else {
            return Ok(None);
        };

        let slug = free_slug(&mut tx, &record.slug, Some(id)).await?;
        let cover_image = record
            .cover_image
            .clone()
            .or_else(|| existing.cover_image.clone());

        sqlx::query(
            r#"
            UPDATE projects
            SET title = ?, slug = ?, content = ?, cover_image = ?, type_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.title)
        .bind(&slug)
        .bind(&record.content)
        .bind(&cover_image)
        .bind(record.type_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sync_technologies(&mut tx, id, technology_ids).await?;

        let project = fetch_project(&mut tx, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Project {} vanished during update", id))?;

        tx.commit().await?;

        let replaced_cover_image = match (&record.cover_image, existing.cover_image) {
            (Some(new), Some(old)) if *new != old => Some(old),
            _ => None,
        };

        Ok(Some(UpdatedProject {
            project,
            replaced_cover_image,
        }))
    }

    /// Delete a project and its join rows, returning the removed record
    pub async fn delete_project(&self, id: i64) -> Result<Option<Project>> {
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;

        let Some(existing) = fetch_project(&mut tx, id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM project_technology WHERE project_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(existing))
    }

    /// All leads, oldest first
    pub async fn list_leads(&self) -> Result<Vec<Lead>> {
        let leads = sqlx::query_as::<_, Lead>(
            "SELECT id, title, content, slug, created_at FROM leads ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(leads)
    }
}

async fn fetch_project(conn: &mut SqliteConnection, id: i64) -> Result<Option<Project>> {
    let project = sqlx::query_as::<_, Project>(&format!(
        "SELECT {} FROM projects WHERE id = ?",
        PROJECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(project)
}

/// Add technologies to a project, keeping existing associations
async fn attach_technologies(
    conn: &mut SqliteConnection,
    project_id: i64,
    technology_ids: &[i64],
) -> Result<()> {
    for technology_id in technology_ids.iter().copied().collect::<BTreeSet<_>>() {
        sqlx::query(
            "INSERT OR IGNORE INTO project_technology (project_id, technology_id) VALUES (?, ?)",
        )
        .bind(project_id)
        .bind(technology_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Replace a project's technologies with exactly `technology_ids`
async fn sync_technologies(
    conn: &mut SqliteConnection,
    project_id: i64,
    technology_ids: &[i64],
) -> Result<()> {
    sqlx::query("DELETE FROM project_technology WHERE project_id = ?")
        .bind(project_id)
        .execute(&mut *conn)
        .await?;

    attach_technologies(conn, project_id, technology_ids).await
}

async fn insert_lead(conn: &mut SqliteConnection, project: &Project) -> Result<Lead> {
    let lead = sqlx::query_as::<_, Lead>(
        r#"
        INSERT INTO leads (title, content, slug, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, title, content, slug, created_at
        "#,
    )
    .bind(&project.title)
    .bind(&project.content)
    .bind(&project.slug)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Ok(lead)
}

/// First slug derived from `base` not used by another project
async fn free_slug(
    conn: &mut SqliteConnection,
    base: &str,
    exclude_id: Option<i64>,
) -> Result<String> {
    let taken: Vec<(String,)> = sqlx::query_as(
        "SELECT slug FROM projects WHERE (slug = ? OR slug LIKE ? || '-%') AND id != ?",
    )
    .bind(base)
    .bind(base)
    .bind(exclude_id.unwrap_or(0))
    .fetch_all(&mut *conn)
    .await?;

    let taken: Vec<String> = taken.into_iter().map(|(slug,)| slug).collect();
    Ok(first_free_slug(base, &taken))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::database::Database;

    async fn storage() -> ProjectStorage {
        let db = Database::in_memory().await.unwrap();
        ProjectStorage::new(db.pool().clone())
    }

    fn record(title: &str, slug: &str) -> ProjectRecord {
        ProjectRecord {
            title: title.to_string(),
            slug: slug.to_string(),
            content: Some("body".to_string()),
            type_id: None,
            cover_image: None,
        }
    }

    async fn tech_ids(storage: &ProjectStorage, names: &[&str]) -> Vec<i64> {
        let all = storage.list_technologies().await.unwrap();
        names
            .iter()
            .map(|name| all.iter().find(|t| t.name == *name).unwrap().id)
            .collect()
    }

    fn names(technologies: &[Technology]) -> Vec<&str> {
        technologies.iter().map(|t| t.name.as_str()).collect()
    }

    #[tokio::test]
    async fn create_without_technologies_leaves_set_empty() {
        let storage = storage().await;
        let (project, lead) = storage
            .create_project(&record("Boolflix", "boolflix"), &[], false)
            .await
            .unwrap();

        assert!(lead.is_none());
        assert!(storage.project_technologies(project.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_attaches_technologies_once() {
        let storage = storage().await;
        let ids = tech_ids(&storage, &["Vue", "CSS"]).await;
        let doubled = [ids.clone(), ids].concat();

        let (project, _) = storage
            .create_project(&record("Boolflix", "boolflix"), &doubled, false)
            .await
            .unwrap();

        let attached = storage.project_technologies(project.id).await.unwrap();
        assert_eq!(names(&attached), vec!["CSS", "Vue"]);
    }

    #[tokio::test]
    async fn create_with_lead_copies_project_fields() {
        let storage = storage().await;
        let (project, lead) = storage
            .create_project(&record("Spotify Clone", "spotify-clone"), &[], true)
            .await
            .unwrap();

        let lead = lead.unwrap();
        assert_eq!(lead.title, project.title);
        assert_eq!(lead.content, project.content);
        assert_eq!(lead.slug, project.slug);
        assert_eq!(storage.list_leads().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_syncs_technologies_to_exact_set() {
        let storage = storage().await;
        let initial = tech_ids(&storage, &["HTML", "CSS", "PHP"]).await;
        let (project, _) = storage
            .create_project(&record("Boolflix", "boolflix"), &initial, false)
            .await
            .unwrap();

        let replacement = tech_ids(&storage, &["PHP", "Rust"]).await;
        storage
            .update_project(project.id, &record("Boolflix", "boolflix"), &replacement)
            .await
            .unwrap()
            .unwrap();

        let attached = storage.project_technologies(project.id).await.unwrap();
        assert_eq!(names(&attached), vec!["PHP", "Rust"]);
    }

    #[tokio::test]
    async fn update_reports_replaced_cover_image() {
        let storage = storage().await;
        let mut first = record("Boolflix", "boolflix");
        first.cover_image = Some("project_image/old.png".to_string());
        let (project, _) = storage.create_project(&first, &[], false).await.unwrap();

        let mut kept = record("Boolflix", "boolflix");
        kept.cover_image = None;
        let updated = storage
            .update_project(project.id, &kept, &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.project.cover_image.as_deref(), Some("project_image/old.png"));
        assert_eq!(updated.replaced_cover_image, None);

        let mut replaced = record("Boolflix", "boolflix");
        replaced.cover_image = Some("project_image/new.png".to_string());
        let updated = storage
            .update_project(project.id, &replaced, &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.project.cover_image.as_deref(), Some("project_image/new.png"));
        assert_eq!(updated.replaced_cover_image.as_deref(), Some("project_image/old.png"));
    }

    #[tokio::test]
    async fn update_missing_project_returns_none() {
        let storage = storage().await;
        let result = storage
            .update_project(42, &record("Ghost", "ghost"), &[])
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn colliding_titles_get_numbered_slugs() {
        let storage = storage().await;
        let (a, _) = storage.create_project(&record("Blog", "blog"), &[], false).await.unwrap();
        let (b, _) = storage.create_project(&record("Blog!", "blog"), &[], false).await.unwrap();
        let (c, _) = storage.create_project(&record("blog", "blog"), &[], false).await.unwrap();

        assert_eq!(a.slug, "blog");
        assert_eq!(b.slug, "blog-2");
        assert_eq!(c.slug, "blog-3");
    }

    #[tokio::test]
    async fn update_keeps_own_slug() {
        let storage = storage().await;
        let (project, _) = storage.create_project(&record("Blog", "blog"), &[], false).await.unwrap();

        let updated = storage
            .update_project(project.id, &record("Blog", "blog"), &[])
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.project.slug, "blog");
    }

    #[tokio::test]
    async fn delete_removes_project_but_not_technologies() {
        let storage = storage().await;
        let ids = tech_ids(&storage, &["Laravel"]).await;
        let before = storage.list_technologies().await.unwrap().len();
        let (project, _) = storage
            .create_project(&record("Boolpress", "boolpress"), &ids, false)
            .await
            .unwrap();

        let deleted = storage.delete_project(project.id).await.unwrap();

        assert_eq!(deleted.map(|p| p.id), Some(project.id));
        assert!(storage.find_project(project.id).await.unwrap().is_none());
        assert!(storage.list_projects().await.unwrap().is_empty());
        assert_eq!(storage.list_technologies().await.unwrap().len(), before);
        assert!(storage.delete_project(project.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_technology_ids_are_reported() {
        let storage = storage().await;
        let known = tech_ids(&storage, &["Rust"]).await;

        let missing = storage
            .missing_technology_ids(&[known[0], 9_999, 9_998])
            .await
            .unwrap();

        assert_eq!(missing, vec![9_998, 9_999]);
    }
}
