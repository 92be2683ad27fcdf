//! Configuration, checkpointing, logging, and plotting helpers.

mod checkpoint;
mod config;
mod logging;
mod plot;

pub use checkpoint::{resolve_weights, CheckpointMeta, CheckpointSlot};
pub use config::{Config, DataConfig, ModelConfig, PlotConfig, TrainingConfig};
pub use logging::setup_logging;
pub use plot::plot_series_overlay;
