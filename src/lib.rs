//! # LSTM Surrogate for Simulated Seaway Load Series
//!
//! This crate trains and evaluates an LSTM that predicts a high-fidelity
//! target load series from a simulated input series. All tensor math,
//! autograd, and optimization are delegated to `tch`; the crate's own code
//! sequences the pipeline: load and standardize the series files, cut them
//! into time-resolution windows, train with early stopping and a single
//! best-model checkpoint slot, reload the best weights, run sample-at-a-time
//! inference, and produce error reports and plots.
//!
//! ## Modules
//!
//! - `data`: series file loading, standardization, windowing, and batching
//! - `model`: the `tch`-backed LSTM with a per-timestep linear head
//! - `training`: epoch loop, early stopping, inference passes, error metrics
//! - `utils`: configuration, checkpoint slot, logging, and plotting
//!
//! ## Example
//!
//! ```no_run
//! use wave_lstm::{
//!     data::{load_and_standardize, window_split, WindowDataset},
//!     model::{LstmConfig, WaveLstm},
//!     training::{Trainer, TrainerConfig},
//!     utils::CheckpointSlot,
//! };
//! use tch::{nn, Device};
//!
//! fn main() -> anyhow::Result<()> {
//!     let device = Device::cuda_if_available();
//!     let (input, target, _) =
//!         load_and_standardize("train_input.csv", "train_target.csv", None)?;
//!     let (x, y) = window_split(&input, &target, 100)?;
//!     let data = WindowDataset::new(&x, &y, device)?;
//!
//!     let vs = nn::VarStore::new(device);
//!     let model = WaveLstm::new(&vs.root(), LstmConfig::default());
//!     let slot = CheckpointSlot::new("checkpoints")?;
//!
//!     let trainer = Trainer::new(TrainerConfig::default(), device);
//!     trainer.train(&model, &vs, &data, &data, &slot)?;
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod model;
pub mod training;
pub mod utils;

pub use data::{load_and_standardize, window_split, DataLoader, WindowDataset};
pub use model::{LstmConfig, WaveLstm};
pub use training::{EarlyStopping, ErrorReport, ErrorSummary, Trainer, TrainerConfig};
pub use utils::{resolve_weights, CheckpointSlot, Config, setup_logging};
