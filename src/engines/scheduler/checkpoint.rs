use crate::error::{Result, TradegridError};
use crate::types::{Elite, OptimizerStatus};
use std::fs;
use std::path::{Path, PathBuf};

pub const CHECKPOINT_DIR: &str = "ribs_checkpoints";
pub const STATUS_FILE: &str = "ribs_status.json";
pub const ARCHIVE_FILE: &str = "ribs_archive.json";

/// Persists optimizer status and archive snapshots with a
/// write-temp-then-rename discipline, so the out-of-process watchdog never
/// observes a partial file.
pub struct CheckpointWriter {
    dir: PathBuf,
}

impl CheckpointWriter {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let dir = root.as_ref().join(CHECKPOINT_DIR);
        fs::create_dir_all(&dir).map_err(|e| {
            TradegridError::Checkpoint(format!(
                "Failed to create checkpoint dir {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self { dir })
    }

    pub fn status_path(&self) -> PathBuf {
        self.dir.join(STATUS_FILE)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dir.join(ARCHIVE_FILE)
    }

    pub fn write_status(&self, status: &OptimizerStatus) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(status)?;
        let path = self.status_path();
        self.write_atomic(&path, &bytes)?;
        Ok(path)
    }

    pub fn write_archive(&self, elites: &[Elite]) -> Result<PathBuf> {
        let bytes = serde_json::to_vec(elites)?;
        let path = self.archive_path();
        self.write_atomic(&path, &bytes)?;
        Ok(path)
    }

    /// Load a previously written archive snapshot for warm restart.
    pub fn load_archive(&self) -> Result<Vec<Elite>> {
        let path = self.archive_path();
        let contents = fs::read_to_string(&path).map_err(|e| {
            TradegridError::Checkpoint(format!(
                "Failed to read archive snapshot {}: {}",
                path.display(),
                e
            ))
        })?;
        let elites = serde_json::from_str(&contents)?;
        Ok(elites)
    }

    pub fn has_archive_snapshot(&self) -> bool {
        self.archive_path().exists()
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|e| {
            TradegridError::Checkpoint(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, path).map_err(|e| {
            TradegridError::Checkpoint(format!(
                "Failed to move {} into place: {}",
                tmp.display(),
                e
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CheckpointInfo, EliteMetadata};
    use chrono::Utc;

    fn status() -> OptimizerStatus {
        OptimizerStatus {
            iterations: 12,
            num_elites: 3,
            coverage: 0.0075,
            qd_score: 4.2,
            latest_checkpoint: Some(CheckpointInfo {
                path: "ribs_archive.json".to_string(),
                mtime: 1700000000.0,
            }),
            last_completed: Some("2023-11-14T22:13:20Z".to_string()),
        }
    }

    #[test]
    fn test_status_round_trip() {
        let root = tempfile::tempdir().unwrap();
        let writer = CheckpointWriter::new(root.path()).unwrap();

        let path = writer.write_status(&status()).unwrap();
        assert!(path.ends_with("ribs_status.json"));

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: OptimizerStatus = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.iterations, 12);
        assert_eq!(parsed.num_elites, 3);
        assert_eq!(parsed.latest_checkpoint.unwrap().mtime, 1700000000.0);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let root = tempfile::tempdir().unwrap();
        let writer = CheckpointWriter::new(root.path()).unwrap();
        writer.write_status(&status()).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(root.path().join(CHECKPOINT_DIR))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "tmp").unwrap_or(false))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_archive_round_trip() {
        let root = tempfile::tempdir().unwrap();
        let writer = CheckpointWriter::new(root.path()).unwrap();

        let elites = vec![Elite {
            solution: vec![0.1, -0.2, 0.3, 0.0, 1.0],
            objective: 1.5,
            descriptor: vec![4.0, 12.0],
            metadata: EliteMetadata {
                generation: 7,
                timestamp: Utc::now(),
            },
        }];
        writer.write_archive(&elites).unwrap();
        assert!(writer.has_archive_snapshot());

        let loaded = writer.load_archive().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].metadata.generation, 7);
        assert_eq!(loaded[0].solution, elites[0].solution);
    }

    #[test]
    fn test_load_missing_archive_is_error() {
        let root = tempfile::tempdir().unwrap();
        let writer = CheckpointWriter::new(root.path()).unwrap();
        assert!(writer.load_archive().is_err());
    }
}
