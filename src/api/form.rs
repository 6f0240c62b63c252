/// Multipart form parsing for project submissions
///
/// Turns the admin form's `multipart/form-data` body into a typed
/// `ProjectCreateInput`. Fields: title, content, type_id, technologies[]
/// (repeatable) and cover_image (file).

use crate::project::types::{ProjectCreateInput, UploadedFile};
use axum::extract::Multipart;
use axum::http::StatusCode;

/// Form submission problems
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Body is not a readable multipart stream
    #[error("malformed form body: {0}")]
    Malformed(String),
    /// Readable, but a field value is unusable
    #[error("invalid form field: {0}")]
    Invalid(String),
}

impl FormError {
    pub fn status(&self) -> StatusCode {
        match self {
            FormError::Malformed(_) => StatusCode::BAD_REQUEST,
            FormError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Read a project submission from a multipart body
pub async fn read_project_form(mut multipart: Multipart) -> Result<ProjectCreateInput, FormError> {
    let mut title = None;
    let mut input = ProjectCreateInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FormError::Malformed(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "cover_image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| FormError::Malformed(e.to_string()))?;
                // Browsers send an empty part when no file was picked
                if !bytes.is_empty() {
                    input.cover_image = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "title" | "content" | "type_id" | "technologies" | "technologies[]" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| FormError::Malformed(e.to_string()))?;
                match name.as_str() {
                    "title" => title = Some(value),
                    "content" => input.content = Some(value),
                    "type_id" => input.type_id = parse_optional_id("type_id", &value)?,
                    _ => {
                        if let Some(id) = parse_optional_id("technologies", &value)? {
                            input.technology_ids.push(id);
                        }
                    }
                }
            }
            other => tracing::debug!("Ignoring form field '{}'", other),
        }
    }

    input.title = title.ok_or_else(|| FormError::Invalid("title is required".to_string()))?;
    Ok(input)
}

fn parse_optional_id(field: &str, value: &str) -> Result<Option<i64>, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| FormError::Invalid(format!("{} must be a numeric id, got '{}'", field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_id_is_absent() {
        assert_eq!(parse_optional_id("type_id", "  ").unwrap(), None);
    }

    #[test]
    fn numeric_id_is_parsed() {
        assert_eq!(parse_optional_id("type_id", " 12 ").unwrap(), Some(12));
    }

    #[test]
    fn non_numeric_id_is_invalid() {
        let err = parse_optional_id("technologies", "rust").unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
