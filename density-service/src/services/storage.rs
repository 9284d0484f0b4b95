use async_trait::async_trait;
use service_core::error::AppError;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Image storage unavailable: {0}")]
    Transient(#[source] anyhow::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => {
                AppError::NotFound(anyhow::anyhow!("Image not found: {}", path))
            }
            StorageError::Transient(e) => AppError::ServiceUnavailable(e),
        }
    }
}

/// Read access to uploaded source photos.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, StorageError>;
}

/// Serves images from a directory on the local filesystem.
pub struct LocalImageStore {
    base_path: PathBuf,
}

impl LocalImageStore {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }

    /// Joins a storage path under the base directory. Absolute paths and `..`
    /// components are refused.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let mut components = relative.components().peekable();
        components.peek()?;
        if components.all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
            Some(self.base_path.join(relative))
        } else {
            None
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve(path).ok_or_else(|| {
            tracing::warn!(path = %path, "Rejected storage path outside the image root");
            StorageError::NotFound(path.to_string())
        })?;

        fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(path.to_string())
            } else {
                tracing::error!(path = ?full_path, error = %e, "Failed to read image");
                StorageError::Transient(anyhow::Error::new(e))
            }
        })
    }
}

/// Process-local image store for tests and local development.
#[derive(Default)]
pub struct InMemoryImageStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, path: impl Into<String>, data: Vec<u8>) {
        self.objects.write().await.insert(path.into(), data);
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn local_store() -> (LocalImageStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("density-images-{}", Uuid::new_v4()));
        let store = LocalImageStore::new(&root).await.unwrap();
        (store, root)
    }

    #[tokio::test]
    async fn test_local_store_reads_nested_paths() {
        let (store, root) = local_store().await;
        fs::create_dir_all(root.join("users/u1")).await.unwrap();
        fs::write(root.join("users/u1/photo.png"), b"png-bytes")
            .await
            .unwrap();

        let data = store.fetch("users/u1/photo.png").await.unwrap();
        assert_eq!(data, b"png-bytes");

        fs::remove_dir_all(root).await.ok();
    }

    #[tokio::test]
    async fn test_local_store_missing_file_is_not_found() {
        let (store, root) = local_store().await;
        let result = store.fetch("nope.png").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        fs::remove_dir_all(root).await.ok();
    }

    #[tokio::test]
    async fn test_local_store_rejects_escaping_paths() {
        let (store, root) = local_store().await;
        for path in ["../secret.png", "/etc/passwd", "a/../../b.png", ""] {
            assert!(
                matches!(store.fetch(path).await, Err(StorageError::NotFound(_))),
                "{} was not rejected",
                path
            );
        }
        fs::remove_dir_all(root).await.ok();
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryImageStore::new();
        store.put("a.png", vec![1, 2, 3]).await;
        assert_eq!(store.fetch("a.png").await.unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            store.fetch("b.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_errors_map_to_http_classes() {
        use axum::http::StatusCode;

        let not_found: AppError = StorageError::NotFound("x".to_string()).into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let transient: AppError = StorageError::Transient(anyhow::anyhow!("down")).into();
        assert_eq!(transient.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
