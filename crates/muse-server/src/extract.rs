use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request};
use muse_core::UploadedFile;

use crate::ServerError;

/// JSON body whose rejection uses the uniform error body
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);

/// Multipart form split into uploaded files and text fields
#[derive(Debug, Default)]
pub struct UploadForm {
    files: HashMap<String, UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Remove a required file field
    pub fn file(&mut self, name: &str) -> Result<UploadedFile, ServerError> {
        self.files
            .remove(name)
            .filter(|file| !file.is_empty())
            .ok_or_else(|| ServerError::InvalidRequest(format!("Missing required '{name}' file")))
    }

    /// Remove a required, non-blank text field
    pub fn text(&mut self, name: &str) -> Result<String, ServerError> {
        self.fields
            .remove(name)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ServerError::InvalidRequest(format!("Missing required '{name}' field")))
    }
}

impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(request, state).await?;
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ServerError::InvalidRequest(format!("Failed to read multipart form: {e}")))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_owned) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::InvalidRequest(format!("Failed to read '{name}' file: {e}")))?;

                form.files.insert(
                    name,
                    UploadedFile::new(bytes, content_type).with_file_name(file_name),
                );
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ServerError::InvalidRequest(format!("Failed to read '{name}' field: {e}")))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }
}
