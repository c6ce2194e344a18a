use sprintboard_core::BoardResult;
use std::path::Path;
use tokio::fs;

/// Writes files through a sibling temp file and a rename, so readers see
/// either the old content or the new one, never a torn write.
pub struct AtomicWriter;

impl AtomicWriter {
    pub async fn write_atomic(path: &Path, data: &[u8]) -> BoardResult<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).await?;

        // Same directory, same filesystem: the rename stays atomic.
        let temp_file = tempfile::NamedTempFile::new_in(parent)?;
        let temp_path = temp_file.into_temp_path();
        fs::write(&temp_path, data).await?;
        fs::rename(&temp_path, path).await?;
        // Already renamed away; nothing left for the guard to delete.
        let _ = temp_path.keep();

        tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    pub async fn read_all(path: &Path) -> BoardResult<Vec<u8>> {
        let data = fs::read(path).await?;
        tracing::debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(data)
    }
}
