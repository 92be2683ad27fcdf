//! Series loading, standardization, windowing, and batching.

mod dataset;
mod series;
mod windows;

pub use dataset::{DataLoader, WindowDataset};
pub use series::{load_and_standardize, read_series_csv, SplitStats, Standardizer};
pub use windows::{assemble_series, window_series, window_split, windows_per_realization};
