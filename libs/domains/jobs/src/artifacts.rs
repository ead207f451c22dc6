//! Per-stage artifact persistence: one immutable JSON file per job per
//! stage, written atomically (spec.md §3 "Artifacts" — write-temp-then-rename).

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Root directory under which `raw/`, `enriched/`, `heur_v2/`, `triage/`,
/// `case/`, `resumo/` each hold one `{job_id}.json` file.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, stage_dir: &str, job_id: Uuid) -> PathBuf {
        self.root.join(stage_dir).join(format!("{job_id}.json"))
    }

    /// Serialize `value` and write it under `{root}/{stage_dir}/{job_id}.json`,
    /// via a sibling `.tmp` file and `rename()` so a reader never observes a
    /// torn write.
    pub async fn write<T: Serialize + Sync>(
        &self,
        stage_dir: &str,
        job_id: Uuid,
        value: &T,
    ) -> Result<PathBuf, ArtifactError> {
        let dir = self.root.join(stage_dir);
        fs::create_dir_all(&dir).await?;

        let final_path = dir.join(format!("{job_id}.json"));
        let tmp_path = dir.join(format!("{job_id}.json.tmp"));

        let bytes = serde_json::to_vec_pretty(value)?;
        fs::write(&tmp_path, &bytes).await?;
        fs::rename(&tmp_path, &final_path).await?;

        Ok(final_path)
    }

    pub async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, ArtifactError> {
        Ok(fs::read(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        value: u32,
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = std::env::temp_dir().join(format!("domain-jobs-test-{}", Uuid::new_v4()));
        let store = ArtifactStore::new(&dir);
        let job_id = Uuid::new_v4();

        let path = store
            .write("raw", job_id, &Sample { value: 42 })
            .await
            .unwrap();
        assert_eq!(path, store.path_for("raw", job_id));

        let bytes = store.read_bytes(&path).await.unwrap();
        let round_tripped: Sample = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(round_tripped, Sample { value: 42 });

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
