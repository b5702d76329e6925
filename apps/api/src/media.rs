//! # Media Storage
//!
//! Uploaded files live on disk under the configured media root; the
//! database only ever stores the relative path.
//!
//! ```text
//! <media_root>/
//! ├── tool_images/<uuid>.<ext>     listing photos (/add-tool/)
//! └── proofs/<uuid>.<ext>          handover proofs (/booking/{id}/proof/)
//! ```
//!
//! Client file names are never used on disk: only the extension is kept,
//! and only from a short allow-list.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::Multipart;
use tracing::{debug, warn};
use uuid::Uuid;

use agrirent_core::ValidationError;

use crate::error::{ApiError, ApiResult};

/// Image extensions accepted for uploads.
const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Which subdirectory an upload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    ToolImage,
    Proof,
}

impl MediaKind {
    pub const fn dir(&self) -> &'static str {
        match self {
            MediaKind::ToolImage => "tool_images",
            MediaKind::Proof => "proofs",
        }
    }
}

/// Filesystem-backed store for uploaded images.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MediaStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the upload directories if missing.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        for kind in [MediaKind::ToolImage, MediaKind::Proof] {
            tokio::fs::create_dir_all(self.root.join(kind.dir())).await?;
        }
        Ok(())
    }

    /// Writes an upload and returns its path relative to the media root.
    pub async fn save(&self, kind: MediaKind, upload: &UploadedFile) -> ApiResult<String> {
        let ext = allowed_extension(&upload.field, upload.file_name.as_deref())?;
        let relative = format!("{}/{}.{}", kind.dir(), Uuid::new_v4(), ext);
        let full = self.root.join(&relative);

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ApiError::internal)?;
        }
        tokio::fs::write(&full, &upload.bytes)
            .await
            .map_err(ApiError::internal)?;

        debug!(path = %relative, size = upload.bytes.len(), "Stored upload");
        Ok(relative)
    }

    /// Best-effort removal of a stored upload (used when the write it
    /// belonged to did not go through).
    pub async fn remove(&self, relative: &str) {
        if let Err(e) = tokio::fs::remove_file(self.root.join(relative)).await {
            warn!(path = %relative, error = %e, "Failed to remove orphaned upload");
        }
    }
}

fn allowed_extension(field: &str, file_name: Option<&str>) -> Result<String, ValidationError> {
    let ext = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(ValidationError::NotAllowed {
            field: field.to_string(),
            allowed: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        })
    }
}

// =============================================================================
// Multipart Forms
// =============================================================================

/// A file part of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Form field the file came from.
    pub field: String,
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// A fully read multipart form: text fields plus file parts.
///
/// Browsers send an empty part for an untouched file input; those are
/// dropped so "no file" looks the same however the form was submitted.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        form.files.insert(
                            name.clone(),
                            UploadedFile {
                                field: name,
                                file_name: Some(file_name),
                                bytes,
                            },
                        );
                    }
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Text value of a field, empty when absent.
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, bytes: &'static [u8]) -> UploadedFile {
        UploadedFile {
            field: "image".to_string(),
            file_name: Some(name.to_string()),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn test_extension_allow_list() {
        assert_eq!(allowed_extension("image", Some("tractor.JPG")).unwrap(), "jpg");
        assert_eq!(allowed_extension("image", Some("a.b.png")).unwrap(), "png");

        let err = allowed_extension("image", Some("payload.exe")).unwrap_err();
        assert_eq!(err.field(), "image");
        assert!(allowed_extension("proof_image", Some("noext")).is_err());
        assert!(allowed_extension("proof_image", None).is_err());
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());
        store.ensure_dirs().await.unwrap();

        let path = store
            .save(MediaKind::Proof, &upload("handover.png", b"\x89PNG"))
            .await
            .unwrap();
        assert!(path.starts_with("proofs/"));
        assert!(path.ends_with(".png"));

        let on_disk = dir.path().join(&path);
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"\x89PNG");

        store.remove(&path).await;
        assert!(!on_disk.exists());
    }

    #[tokio::test]
    async fn test_client_file_name_is_not_used() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        let path = store
            .save(MediaKind::ToolImage, &upload("../../etc/passwd.jpg", b"x"))
            .await
            .unwrap();
        assert!(path.starts_with("tool_images/"));
        assert!(!path.contains(".."));
    }
}
