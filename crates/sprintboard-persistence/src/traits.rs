use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprintboard_core::BoardResult;
use std::path::Path;
use uuid::Uuid;

/// Who saved a snapshot, when, and in which format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    pub format_version: u32,
    /// Process that performed the save.
    pub instance_id: Uuid,
    pub saved_at: DateTime<Utc>,
}

impl PersistenceMetadata {
    pub fn new(format_version: u32, instance_id: Uuid) -> Self {
        Self {
            format_version,
            instance_id,
            saved_at: Utc::now(),
        }
    }
}

/// Raw JSON of the whole board data set plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub data: Vec<u8>,
    pub metadata: PersistenceMetadata,
}

/// Backend holding board snapshots.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    async fn save(&self, snapshot: StoreSnapshot) -> BoardResult<PersistenceMetadata>;

    async fn load(&self) -> BoardResult<(StoreSnapshot, PersistenceMetadata)>;

    async fn exists(&self) -> bool;

    fn instance_id(&self) -> Uuid;

    fn path(&self) -> &Path;
}
