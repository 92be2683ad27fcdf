//! Training loop with early stopping and single-slot checkpointing.
//!
//! The numerical work (forward pass, gradients, parameter updates) is
//! delegated to `tch`; this loop only sequences the passes, tracks the
//! best validation loss, and overwrites the checkpoint slot on
//! improvement.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array3;
use tch::nn::{self, OptimizerConfig};
use tch::{Device, Kind};
use tracing::{info, warn};

use crate::data::{DataLoader, WindowDataset};
use crate::model::WaveLstm;
use crate::training::session::{EarlyStopping, PATIENCE_LIMIT};
use crate::utils::CheckpointSlot;

/// Training configuration.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Maximum number of epochs
    pub epochs: usize,
    /// Adam learning rate
    pub learning_rate: f64,
    /// Batch size for the training pass
    pub train_batch_size: usize,
    /// Batch size for the validation pass
    pub val_batch_size: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 200,
            learning_rate: 1e-3,
            train_batch_size: 32,
            val_batch_size: 32,
        }
    }
}

/// Losses recorded for one epoch.
#[derive(Debug, Clone)]
pub struct EpochRecord {
    pub epoch: usize,
    pub train_loss: f64,
    pub val_loss: f64,
}

/// Drives the epoch loop and the final inference passes.
pub struct Trainer {
    config: TrainerConfig,
    device: Device,
}

impl Trainer {
    pub fn new(config: TrainerConfig, device: Device) -> Self {
        Self { config, device }
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Run the full training loop.
    ///
    /// Each epoch performs one update pass over the training windows and
    /// one evaluation pass over the validation windows. The checkpoint
    /// slot is overwritten whenever the validation loss improves on the
    /// best seen so far by the relative threshold; the loop stops at the
    /// epoch cap or when patience runs out, whichever comes first.
    pub fn train(
        &self,
        model: &WaveLstm,
        vs: &nn::VarStore,
        train_data: &WindowDataset,
        val_data: &WindowDataset,
        slot: &CheckpointSlot,
    ) -> Result<Vec<EpochRecord>> {
        let mut optimizer = nn::Adam::default().build(vs, self.config.learning_rate)?;
        let mut session = EarlyStopping::new();
        let mut history = Vec::new();

        let pb = ProgressBar::new(self.config.epochs as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );

        for epoch in 1..=self.config.epochs {
            let train_loss = self.train_epoch(model, &mut optimizer, train_data)?;
            let val_loss = self.evaluate(model, val_data)?;

            let decision = session.observe(val_loss);
            if decision.improved {
                slot.save(vs, epoch, val_loss)?;
            }

            info!(
                "Epoch {:>3}/{} | train_loss={:.6} | val_loss={:.6}",
                epoch, self.config.epochs, train_loss, val_loss
            );

            history.push(EpochRecord {
                epoch,
                train_loss,
                val_loss,
            });

            pb.set_message(format!("val_loss: {:.6}", val_loss));
            pb.inc(1);

            if decision.stop {
                warn!(
                    "Early stopping at epoch {}: no improvement for {} epochs",
                    epoch,
                    PATIENCE_LIMIT + 1
                );
                break;
            }
        }

        pb.finish_with_message(format!("best val_loss: {:.6}", session.best_val_loss()));
        info!("Best validation loss: {:.6}", session.best_val_loss());

        Ok(history)
    }

    /// One pass of parameter updates over the training windows.
    fn train_epoch(
        &self,
        model: &WaveLstm,
        optimizer: &mut nn::Optimizer,
        data: &WindowDataset,
    ) -> Result<f64> {
        let loader = DataLoader::new(data.len(), self.config.train_batch_size, true);
        let mut total_loss = 0.0;
        let mut num_batches = 0;

        for indices in loader {
            let (inputs, targets) = data.get_batch(&indices);

            let prediction = model.forward(&inputs);
            let loss = model.mse(&prediction, &targets);

            optimizer.zero_grad();
            loss.backward();
            optimizer.step();

            total_loss += loss.double_value(&[]);
            num_batches += 1;
        }

        Ok(total_loss / num_batches.max(1) as f64)
    }

    /// One evaluation pass over a dataset, no gradients.
    pub fn evaluate(&self, model: &WaveLstm, data: &WindowDataset) -> Result<f64> {
        let loader = DataLoader::new(data.len(), self.config.val_batch_size, false);
        let mut total_loss = 0.0;
        let mut num_batches = 0;

        for indices in loader {
            let (inputs, targets) = data.get_batch(&indices);

            let prediction = tch::no_grad(|| model.forward(&inputs));
            let loss = model.mse(&prediction, &targets);

            total_loss += loss.double_value(&[]);
            num_batches += 1;
        }

        Ok(total_loss / num_batches.max(1) as f64)
    }

    /// Run the model over every window, one sample at a time, and collect
    /// the outputs as a `[n, T, output_size]` array for reassembly.
    pub fn predict_windows(&self, model: &WaveLstm, data: &WindowDataset) -> Result<Array3<f64>> {
        let loader = DataLoader::new(data.len(), 1, false);
        let mut values: Vec<f64> = Vec::new();

        for indices in loader {
            let (inputs, _) = data.get_batch(&indices);

            let output = tch::no_grad(|| model.forward(&inputs));
            let flat_tensor = output.to_kind(Kind::Double).reshape([-1]);
            let flat: Vec<f64> = Vec::try_from(&flat_tensor)?;
            values.extend(flat);
        }

        let windows = data.len();
        let window_len = data.window_len() as usize;
        let channels = model.config().output_size as usize;

        Ok(Array3::from_shape_vec(
            (windows, window_len, channels),
            values,
        )?)
    }
}
