//! CLI for training and evaluating the LSTM load-series surrogate.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ndarray::{s, Array3};
use tch::{nn, Device};
use tracing::{info, warn};

use wave_lstm::data::{
    assemble_series, load_and_standardize, window_split, SplitStats, WindowDataset,
};
use wave_lstm::model::{LstmConfig, WaveLstm};
use wave_lstm::training::{ErrorReport, ErrorSummary, Trainer, TrainerConfig};
use wave_lstm::utils::{
    plot_series_overlay, resolve_weights, setup_logging, CheckpointSlot, Config,
};

#[derive(Parser)]
#[command(name = "wave-lstm")]
#[command(about = "LSTM surrogate for predicting seaway load series")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a default configuration file
    Init {
        /// Output path for the config file
        #[arg(short, long, default_value = "config.json")]
        output: String,
    },

    /// Run the full pipeline: train (or load weights), infer, report, plot
    Run {
        /// Configuration file
        #[arg(short, long, default_value = "config.json")]
        config: String,

        /// Use GPU if available
        #[arg(long)]
        gpu: bool,
    },
}

/// One split's windowed data plus what reporting needs to reassemble it.
struct Split {
    name: &'static str,
    dataset: WindowDataset,
    input_windows: Array3<f64>,
    target_windows: Array3<f64>,
    realizations: usize,
}

fn load_split(
    name: &'static str,
    input_path: &str,
    target_path: &str,
    stats: Option<&SplitStats>,
    time_resolution: usize,
    device: Device,
) -> Result<(Split, SplitStats)> {
    info!("Loading {} data", name);
    let (input, target, stats) = load_and_standardize(input_path, target_path, stats)?;
    let realizations = input.dim().0;

    let (input_windows, target_windows) = window_split(&input, &target, time_resolution)?;
    info!(
        "{}_input has shape {:?}, {}_target has shape {:?}",
        name,
        input_windows.dim(),
        name,
        target_windows.dim()
    );

    let dataset = WindowDataset::new(&input_windows, &target_windows, device)?;

    Ok((
        Split {
            name,
            dataset,
            input_windows,
            target_windows,
            realizations,
        },
        stats,
    ))
}

fn run(config: Config, gpu: bool) -> Result<()> {
    info!("CUDA available: {}", tch::Cuda::is_available());
    let device = if gpu && tch::Cuda::is_available() {
        info!("Using CUDA GPU");
        Device::Cuda(0)
    } else {
        info!("Using CPU");
        Device::Cpu
    };

    // Standardization statistics come from the training split and are
    // reused verbatim for validation and test.
    let time_resolution = config.data.time_resolution;
    let (train, stats) = load_split(
        "train",
        &config.data.train_input,
        &config.data.train_target,
        None,
        time_resolution,
        device,
    )?;
    let (val, _) = load_split(
        "validation",
        &config.data.val_input,
        &config.data.val_target,
        Some(&stats),
        time_resolution,
        device,
    )?;
    let (test, _) = load_split(
        "test",
        &config.data.test_input,
        &config.data.test_target,
        Some(&stats),
        time_resolution,
        device,
    )?;

    // Model and optimizer state live in the var store.
    let mut vs = nn::VarStore::new(device);
    let model = WaveLstm::new(
        &vs.root(),
        LstmConfig {
            input_size: config.model.input_size,
            hidden_size: config.model.hidden_size,
            num_layers: config.model.num_layers,
            output_size: config.model.output_size,
            bidirectional: config.model.bidirectional,
            dropout: config.model.dropout,
        },
    );
    info!(
        "Model ready: {} layers, hidden size {}",
        config.model.num_layers, config.model.hidden_size
    );

    let slot = CheckpointSlot::new(&config.training.checkpoint_dir)?;
    let trainer = Trainer::new(
        TrainerConfig {
            epochs: config.training.epochs,
            learning_rate: config.training.learning_rate,
            train_batch_size: config.data.train_batch_size,
            val_batch_size: config.data.val_batch_size,
        },
        device,
    );

    if config.training.training_mode {
        info!("Beginning training");
        trainer.train(&model, &vs, &train.dataset, &val.dataset, &slot)?;
        info!("Training done");
    }

    // Restore the best parameters found during the run, or the explicitly
    // named weights when training was skipped.
    let weights = resolve_weights(
        config.training.training_mode,
        &slot,
        &config.training.weights_to_load,
    )?;
    vs.load(&weights)
        .with_context(|| format!("Cannot load weights from '{}'", weights.display()))?;
    info!("Loaded weights from '{}'", weights.display());

    // Final inference: one sample at a time over train, validation, test.
    let splits = [&train, &val, &test];
    let mut outputs = Vec::with_capacity(splits.len());

    let start = Instant::now();
    for split in splits {
        let windows = trainer.predict_windows(&model, &split.dataset)?;
        outputs.push(assemble_series(&windows, split.realizations)?);
    }
    let elapsed = start.elapsed();

    for (split, output) in splits.iter().zip(&outputs) {
        info!("{} output shape {:?}", split.name, output.dim());
    }
    let total_realizations: usize = splits.iter().map(|s| s.realizations).sum();
    info!(
        "Time to produce output for {} realizations: {:.3}s",
        total_realizations,
        elapsed.as_secs_f64()
    );

    // Reassemble the windowed inputs and targets so every series has the
    // same (possibly truncated) length as the model output.
    let mut inputs_full = Vec::with_capacity(splits.len());
    let mut targets_full = Vec::with_capacity(splits.len());
    for split in splits {
        inputs_full.push(assemble_series(&split.input_windows, split.realizations)?);
        targets_full.push(assemble_series(&split.target_windows, split.realizations)?);
    }

    // The leading input channels carry the low-fidelity simulation of the
    // target quantities; report them as the baseline the surrogate must beat.
    let output_channels = config.model.output_size as usize;
    if inputs_full[0].dim().2 >= output_channels {
        let baseline = ErrorReport {
            train: baseline_summary(&inputs_full[0], &targets_full[0], output_channels),
            validation: baseline_summary(&inputs_full[1], &targets_full[1], output_channels),
            test: baseline_summary(&inputs_full[2], &targets_full[2], output_channels),
        };
        baseline.log("Simulation baseline");
    } else {
        warn!(
            "Input has {} channels but the target has {}; skipping the baseline report",
            inputs_full[0].dim().2,
            output_channels
        );
    }

    let report = ErrorReport {
        train: ErrorSummary::compute(&outputs[0], &targets_full[0]),
        validation: ErrorSummary::compute(&outputs[1], &targets_full[1]),
        test: ErrorSummary::compute(&outputs[2], &targets_full[2]),
    };
    report.log("LSTM surrogate");

    plot_results(&config, splits, &outputs, &targets_full)?;

    Ok(())
}

fn baseline_summary(
    input_full: &Array3<f64>,
    target_full: &Array3<f64>,
    output_channels: usize,
) -> ErrorSummary {
    let baseline = input_full.slice(s![.., .., ..output_channels]).to_owned();
    ErrorSummary::compute(&baseline, target_full)
}

fn plot_results(
    config: &Config,
    splits: [&Split; 3],
    outputs: &[Array3<f64>],
    targets_full: &[Array3<f64>],
) -> Result<()> {
    std::fs::create_dir_all(&config.plot.output_dir)?;

    for (split, (output, target)) in splits.iter().zip(outputs.iter().zip(targets_full)) {
        let (realizations, _, channels) = target.dim();
        if config.plot.realization >= realizations || config.plot.channel >= channels {
            warn!(
                "Plot selection (realization {}, channel {}) is out of range for the {} split; skipping",
                config.plot.realization, config.plot.channel, split.name
            );
            continue;
        }

        let path = Path::new(&config.plot.output_dir).join(format!("{}_prediction.png", split.name));
        plot_series_overlay(
            output,
            target,
            config.plot.realization,
            config.plot.channel,
            &format!("{} split: predicted vs target", split.name),
            &path,
        )?;
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging("info");

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output } => {
            info!("Creating default configuration");
            let config = Config::default();
            config.to_file(&output)?;
            info!("Configuration saved to '{}'", output);
        }

        Commands::Run { config, gpu } => {
            let config = Config::from_file(&config)?;
            run(config, gpu)?;
        }
    }

    Ok(())
}
