//! Local filesystem document storage
//!
//! Uploaded identity documents are written under a configured directory and
//! served back under a public URL prefix. Only image uploads are accepted.

use async_trait::async_trait;
use rentwheels_core::{
    config::StorageConfig,
    models::DocumentKind,
    traits::{DocumentStore, StoredDocument},
    AppError, AppResult,
};
use std::path::PathBuf;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Stores documents on the local filesystem
pub struct LocalDocumentStore {
    upload_dir: PathBuf,
    public_base_url: String,
    max_upload_bytes: usize,
}

impl LocalDocumentStore {
    /// Create a store from the storage configuration
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            upload_dir: PathBuf::from(&config.upload_dir),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Map an accepted content type to its file extension
    fn extension_for(content_type: &str) -> Option<&'static str> {
        match content_type {
            "image/jpeg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/webp" => Some("webp"),
            _ => None,
        }
    }

    /// Resolve a public URL back to the file it names
    ///
    /// Returns None for URLs outside this store's prefix or containing
    /// path separators, so a crafted URL cannot escape the upload dir.
    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let filename = url.strip_prefix(&self.public_base_url)?.strip_prefix('/')?;
        if filename.is_empty() || filename.contains('/') || filename.contains("..") {
            return None;
        }
        Some(self.upload_dir.join(filename))
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn store(
        &self,
        kind: DocumentKind,
        original_filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> AppResult<StoredDocument> {
        let ext = Self::extension_for(content_type).ok_or_else(|| {
            AppError::validation_field(
                kind.to_string(),
                format!("Unsupported file type '{}', expected an image", content_type),
            )
        })?;

        if data.is_empty() {
            return Err(AppError::validation_field(
                kind.to_string(),
                "Uploaded file is empty",
            ));
        }

        if data.len() > self.max_upload_bytes {
            return Err(AppError::validation_field(
                kind.to_string(),
                format!(
                    "File exceeds the maximum upload size of {} bytes",
                    self.max_upload_bytes
                ),
            ));
        }

        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let filename = format!("{}_{}.{}", kind, Uuid::new_v4(), ext);
        let path = self.upload_dir.join(&filename);
        tokio::fs::write(&path, &data).await?;

        debug!(
            kind = %kind,
            original_filename,
            path = %path.display(),
            "Document stored"
        );

        Ok(StoredDocument {
            kind,
            url: format!("{}/{}", self.public_base_url, filename),
        })
    }

    #[instrument(skip(self))]
    async fn remove(&self, url: &str) -> AppResult<()> {
        let path = match self.path_for_url(url) {
            Some(path) => path,
            None => {
                warn!(url, "Refusing to remove document outside the upload dir");
                return Err(AppError::Storage(format!("Unknown document URL: {}", url)));
            }
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone, nothing to do
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for LocalDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalDocumentStore")
            .field("upload_dir", &self.upload_dir)
            .field("public_base_url", &self.public_base_url)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}
