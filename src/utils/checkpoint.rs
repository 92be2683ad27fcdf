//! Single-slot best-model checkpointing.
//!
//! One weights file, overwritten in place on every improvement, plus a
//! JSON sidecar recording which epoch produced it. The weights format is
//! owned by `tch` (`VarStore::save`/`load`).

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tch::nn;

/// Metadata written next to the weights file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    /// Epoch that produced the weights
    pub epoch: usize,
    /// Validation loss at that epoch
    pub val_loss: f64,
    /// Write timestamp
    pub timestamp: String,
}

/// The overwrite-in-place slot holding the best weights so far.
pub struct CheckpointSlot {
    dir: PathBuf,
}

impl CheckpointSlot {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Path of the weights file.
    pub fn weights_path(&self) -> PathBuf {
        self.dir.join("best_model.pt")
    }

    fn meta_path(&self) -> PathBuf {
        self.dir.join("checkpoint.json")
    }

    /// Overwrite the slot with the current parameters.
    pub fn save(&self, vs: &nn::VarStore, epoch: usize, val_loss: f64) -> Result<()> {
        let path = self.weights_path();
        vs.save(&path)
            .with_context(|| format!("Cannot save checkpoint to '{}'", path.display()))?;

        let meta = CheckpointMeta {
            epoch,
            val_loss,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        fs::write(self.meta_path(), serde_json::to_string_pretty(&meta)?)?;

        tracing::debug!("Saved checkpoint at epoch {} (val_loss={:.6})", epoch, val_loss);
        Ok(())
    }

    /// Read the sidecar metadata.
    pub fn load_meta(&self) -> Result<CheckpointMeta> {
        let path = self.meta_path();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read checkpoint metadata '{}'", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Pick the weights file for the inference passes.
///
/// After a training run the slot written during the run is used. With
/// training skipped, the explicitly named file must already exist;
/// a missing file is a configuration error surfaced before any inference.
pub fn resolve_weights(
    training_mode: bool,
    slot: &CheckpointSlot,
    weights_to_load: &str,
) -> Result<PathBuf> {
    if training_mode {
        return Ok(slot.weights_path());
    }

    let path = PathBuf::from(weights_to_load);
    if !path.exists() {
        bail!(
            "Weights file '{}' does not exist; set training_mode or point weights_to_load at a trained model",
            path.display()
        );
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_meta_serialization() {
        let meta = CheckpointMeta {
            epoch: 12,
            val_loss: 0.031,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&meta).unwrap();
        let loaded: CheckpointMeta = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.epoch, 12);
        assert_eq!(loaded.val_loss, 0.031);
    }

    #[test]
    fn test_resolve_weights_prefers_slot_after_training() {
        let dir = tempdir().unwrap();
        let slot = CheckpointSlot::new(dir.path()).unwrap();

        let path = resolve_weights(true, &slot, "ignored.pt").unwrap();
        assert_eq!(path, slot.weights_path());
    }

    #[test]
    fn test_resolve_weights_missing_external_file_is_config_error() {
        let dir = tempdir().unwrap();
        let slot = CheckpointSlot::new(dir.path()).unwrap();

        let missing = dir.path().join("no_such_model.pt");
        let err = resolve_weights(false, &slot, missing.to_str().unwrap());
        assert!(err.is_err());
    }

    #[test]
    fn test_resolve_weights_accepts_existing_external_file() {
        let dir = tempdir().unwrap();
        let slot = CheckpointSlot::new(dir.path()).unwrap();

        let external = dir.path().join("model.pt");
        std::fs::write(&external, b"weights").unwrap();

        let path = resolve_weights(false, &slot, external.to_str().unwrap()).unwrap();
        assert_eq!(path, external);
    }

    #[test]
    fn test_save_and_reload_meta() {
        let dir = tempdir().unwrap();
        let slot = CheckpointSlot::new(dir.path()).unwrap();

        let vs = nn::VarStore::new(tch::Device::Cpu);
        slot.save(&vs, 3, 0.5).unwrap();
        slot.save(&vs, 7, 0.25).unwrap();

        // Single slot: the second save overwrites the first.
        let meta = slot.load_meta().unwrap();
        assert_eq!(meta.epoch, 7);
        assert_eq!(meta.val_loss, 0.25);
    }
}
