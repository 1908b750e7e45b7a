use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

use crate::platform::Persistence;

const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024;
const LARGE_CONTENT_THRESHOLD: usize = 50 * 1024 * 1024;
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Filesystem-backed persistence on tokio::fs.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileManager;

impl FileManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Persistence for FileManager {
    async fn read_file(&self, path: &Path) -> Result<String> {
        match fs::metadata(path).await {
            Ok(metadata) => {
                if !metadata.is_file() {
                    return Err(anyhow::anyhow!("Not a file: {}", path.display()));
                }
                if metadata.len() > LARGE_FILE_THRESHOLD {
                    log::warn!(
                        "Large file detected ({} bytes): {}",
                        metadata.len(),
                        path.display()
                    );
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(anyhow::anyhow!("File not found: {}", path.display()));
            }
            Err(e) => {
                log::warn!("Failed to get file metadata: {}", e);
            }
        }

        match fs::read_to_string(path).await {
            Ok(content) => {
                if content.contains('\0') {
                    return Err(anyhow::anyhow!(
                        "File appears to be binary: {}",
                        path.display()
                    ));
                }
                log::info!("Successfully opened file: {}", path.display());
                Ok(content)
            }
            Err(e) => {
                let error_msg = match e.kind() {
                    std::io::ErrorKind::PermissionDenied => {
                        format!("Permission denied: {}", path.display())
                    }
                    std::io::ErrorKind::NotFound => {
                        format!("File not found: {}", path.display())
                    }
                    std::io::ErrorKind::InvalidData => {
                        format!("File is not valid UTF-8: {}", path.display())
                    }
                    _ => format!("Failed to read {}: {}", path.display(), e),
                };
                Err(anyhow::anyhow!(error_msg))
            }
        }
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if content.len() > LARGE_CONTENT_THRESHOLD {
            return Err(anyhow::anyhow!(
                "Content too large to save ({} bytes)",
                content.len()
            ));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !fs::try_exists(parent).await.unwrap_or(false) {
                fs::create_dir_all(parent).await.map_err(|e| {
                    anyhow::anyhow!("Failed to create directory: {} - {}", parent.display(), e)
                })?;
                log::info!("Created directory: {}", parent.display());
            }
        }

        if let Ok(metadata) = fs::metadata(path).await {
            if metadata.permissions().readonly() {
                return Err(anyhow::anyhow!("File is read-only: {}", path.display()));
            }
        }

        let mut attempts = 0;
        loop {
            match fs::write(path, content.as_bytes()).await {
                Ok(()) => {
                    log::info!("Successfully saved file: {}", path.display());
                    return Ok(());
                }
                Err(e) => {
                    attempts += 1;
                    if attempts >= MAX_WRITE_ATTEMPTS {
                        let error_msg = match e.kind() {
                            std::io::ErrorKind::PermissionDenied => {
                                format!("Permission denied: {}", path.display())
                            }
                            std::io::ErrorKind::WriteZero => {
                                format!("Disk may be full: {}", path.display())
                            }
                            _ => format!("Failed to write {}: {}", path.display(), e),
                        };
                        return Err(anyhow::anyhow!(error_msg));
                    }

                    tokio::time::sleep(tokio::time::Duration::from_millis(100 * attempts as u64))
                        .await;
                    log::warn!(
                        "Save attempt {} failed for {}, retrying...",
                        attempts,
                        path.display()
                    );
                }
            }
        }
    }

    async fn path_exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn is_file(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
    }
}
