use crate::store::atomic_writer::AtomicWriter;
use crate::traits::{PersistenceMetadata, PersistenceStore, StoreSnapshot};
use sprintboard_core::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Envelope version this build reads and writes.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk layout: `{ "version", "metadata", "data" }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    pub data: serde_json::Value,
}

impl JsonEnvelope {
    /// Envelope around an empty data set.
    pub fn empty() -> Self {
        Self {
            version: FORMAT_VERSION,
            metadata: PersistenceMetadata::new(FORMAT_VERSION, Uuid::nil()),
            data: serde_json::json!({ "projects": [], "sprints": [], "issues": [] }),
        }
    }

    pub fn to_json_string(&self) -> BoardResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BoardError::Serialization(e.to_string()))
    }
}

/// Single JSON file holding every project, sprint and issue.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    instance_id: Uuid,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_instance_id(path, Uuid::new_v4())
    }

    pub fn with_instance_id(path: impl AsRef<Path>, instance_id: Uuid) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id,
        }
    }
}

#[async_trait::async_trait]
impl PersistenceStore for JsonFileStore {
    async fn save(&self, mut snapshot: StoreSnapshot) -> BoardResult<PersistenceMetadata> {
        snapshot.metadata.format_version = FORMAT_VERSION;
        snapshot.metadata.instance_id = self.instance_id;
        snapshot.metadata.saved_at = chrono::Utc::now();

        let data: serde_json::Value = serde_json::from_slice(&snapshot.data)
            .map_err(|e| BoardError::Serialization(e.to_string()))?;
        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: snapshot.metadata.clone(),
            data,
        };
        let bytes = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| BoardError::Serialization(e.to_string()))?;

        AtomicWriter::write_atomic(&self.path, &bytes).await?;
        tracing::info!("Saved {} bytes to {}", bytes.len(), self.path.display());

        Ok(snapshot.metadata)
    }

    async fn load(&self) -> BoardResult<(StoreSnapshot, PersistenceMetadata)> {
        let bytes = AtomicWriter::read_all(&self.path).await?;
        let envelope: JsonEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| BoardError::Serialization(e.to_string()))?;

        if envelope.version != FORMAT_VERSION {
            return Err(BoardError::Serialization(format!(
                "Unsupported format version {} in {}",
                envelope.version,
                self.path.display()
            )));
        }

        let data = serde_json::to_vec(&envelope.data)
            .map_err(|e| BoardError::Serialization(e.to_string()))?;
        tracing::info!("Loaded {} bytes from {}", bytes.len(), self.path.display());

        let snapshot = StoreSnapshot {
            data,
            metadata: envelope.metadata.clone(),
        };
        Ok((snapshot, envelope.metadata))
    }

    async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
