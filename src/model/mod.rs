//! Sequence model module.

mod lstm;

pub use lstm::{LstmConfig, WaveLstm};
