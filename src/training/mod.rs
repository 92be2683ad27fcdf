//! Training loop, early stopping, and evaluation metrics.

mod metrics;
mod session;
mod trainer;

pub use metrics::{mae, mse, r2_score, rmse, ErrorReport, ErrorSummary};
pub use session::{EarlyStopping, EpochDecision, IMPROVEMENT_FACTOR, PATIENCE_LIMIT};
pub use trainer::{EpochRecord, Trainer, TrainerConfig};
