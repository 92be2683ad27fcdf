//! Configuration handling.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub training: TrainingConfig,
    pub plot: PlotConfig,
}

/// Data configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Training input series file
    pub train_input: String,
    /// Training target series file
    pub train_target: String,
    /// Validation input series file
    pub val_input: String,
    /// Validation target series file
    pub val_target: String,
    /// Test input series file
    pub test_input: String,
    /// Test target series file
    pub test_target: String,
    /// Window length used to cut full series into samples
    pub time_resolution: usize,
    /// Batch size for the training pass
    pub train_batch_size: usize,
    /// Batch size for the validation pass
    pub val_batch_size: usize,
}

/// Model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number of input channels
    pub input_size: i64,
    /// Hidden state size
    pub hidden_size: i64,
    /// Number of stacked LSTM layers
    pub num_layers: i64,
    /// Number of target channels
    pub output_size: i64,
    /// Run the sequence in both directions
    pub bidirectional: bool,
    /// Dropout between stacked layers
    pub dropout: f64,
}

/// Training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Train before inference; when false, `weights_to_load` is used instead
    pub training_mode: bool,
    /// Weights file loaded when training is skipped
    pub weights_to_load: String,
    /// Maximum number of epochs
    pub epochs: usize,
    /// Adam learning rate
    pub learning_rate: f64,
    /// Directory holding the best-model checkpoint slot
    pub checkpoint_dir: String,
}

/// Plot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Directory for generated PNG files
    pub output_dir: String,
    /// Realization drawn in the overlay plots
    pub realization: usize,
    /// Target channel drawn in the overlay plots
    pub channel: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                train_input: "data/train_input.csv".to_string(),
                train_target: "data/train_target.csv".to_string(),
                val_input: "data/val_input.csv".to_string(),
                val_target: "data/val_target.csv".to_string(),
                test_input: "data/test_input.csv".to_string(),
                test_target: "data/test_target.csv".to_string(),
                time_resolution: 100,
                train_batch_size: 32,
                val_batch_size: 32,
            },
            model: ModelConfig {
                input_size: 4,
                hidden_size: 64,
                num_layers: 2,
                output_size: 3,
                bidirectional: false,
                dropout: 0.0,
            },
            training: TrainingConfig {
                training_mode: true,
                weights_to_load: "model_to_load.pt".to_string(),
                epochs: 200,
                learning_rate: 1e-3,
                checkpoint_dir: "checkpoints".to_string(),
            },
            plot: PlotConfig {
                output_dir: "plots".to_string(),
                realization: 0,
                channel: 0,
            },
        }
    }
}

impl Config {
    /// Load configuration from file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file '{}'", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Cannot parse config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}
