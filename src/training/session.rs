//! Early-stopping bookkeeping for the epoch loop.
//!
//! The state the loop needs (best validation loss and the count of
//! consecutive non-improving epochs) lives in an explicit value threaded
//! through each epoch, so the stopping rule can be exercised against stub
//! loss sequences without the tensor framework.

/// A validation loss must fall below this fraction of the best loss seen
/// so far to count as an improvement.
pub const IMPROVEMENT_FACTOR: f64 = 0.99;

/// Consecutive non-improving epochs tolerated before stopping.
pub const PATIENCE_LIMIT: usize = 50;

/// What the epoch loop should do after one validation observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochDecision {
    /// The checkpoint slot should be overwritten with the current parameters.
    pub improved: bool,
    /// The patience limit is exhausted; no further epochs should run.
    pub stop: bool,
}

/// Validation-loss tracker with relative-improvement early stopping.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    best_val_loss: f64,
    patience: usize,
}

impl EarlyStopping {
    pub fn new() -> Self {
        Self {
            best_val_loss: f64::INFINITY,
            patience: 0,
        }
    }

    /// Record one epoch's validation loss.
    ///
    /// An improving loss becomes the new best and resets the patience
    /// counter; any other loss increments it. Equal losses, and losses
    /// above `IMPROVEMENT_FACTOR` times the best, are not improvements.
    pub fn observe(&mut self, val_loss: f64) -> EpochDecision {
        let improved = val_loss < IMPROVEMENT_FACTOR * self.best_val_loss;

        if improved {
            self.best_val_loss = val_loss;
            self.patience = 0;
        } else {
            self.patience += 1;
        }

        EpochDecision {
            improved,
            stop: self.patience > PATIENCE_LIMIT,
        }
    }

    /// Best validation loss observed so far.
    pub fn best_val_loss(&self) -> f64 {
        self.best_val_loss
    }

    /// Consecutive non-improving epochs since the last improvement.
    pub fn patience(&self) -> usize {
        self.patience
    }
}

impl Default for EarlyStopping {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_improves() {
        let mut session = EarlyStopping::new();
        let decision = session.observe(1.0);

        assert!(decision.improved);
        assert!(!decision.stop);
        assert_eq!(session.best_val_loss(), 1.0);
        assert_eq!(session.patience(), 0);
    }

    #[test]
    fn test_marginal_decrease_is_not_improvement() {
        let mut session = EarlyStopping::new();
        session.observe(1.0);

        // 0.995x of best is above the 0.99 threshold: no reset, no new best.
        let decision = session.observe(0.995);
        assert!(!decision.improved);
        assert_eq!(session.best_val_loss(), 1.0);
        assert_eq!(session.patience(), 1);
    }

    #[test]
    fn test_patience_resets_on_improvement() {
        let mut session = EarlyStopping::new();
        session.observe(1.0);
        session.observe(1.0);
        session.observe(1.0);
        assert_eq!(session.patience(), 2);

        let decision = session.observe(0.5);
        assert!(decision.improved);
        assert_eq!(session.patience(), 0);
        assert_eq!(session.best_val_loss(), 0.5);
    }

    #[test]
    fn test_patience_increments_by_one_per_stagnant_epoch() {
        let mut session = EarlyStopping::new();
        session.observe(1.0);

        for expected in 1..=PATIENCE_LIMIT {
            let decision = session.observe(1.0);
            assert_eq!(session.patience(), expected);
            assert!(!decision.stop, "stopped early at patience {expected}");
        }

        // The 51st stagnant epoch exceeds the limit.
        let decision = session.observe(1.0);
        assert_eq!(session.patience(), PATIENCE_LIMIT + 1);
        assert!(decision.stop);
    }

    #[test]
    fn test_single_improvement_then_stagnation_stops_at_epoch_52() {
        let mut session = EarlyStopping::new();
        let mut checkpoint_writes = 0;
        let mut epochs_run = 0;

        for _ in 0..200 {
            epochs_run += 1;
            let decision = session.observe(0.95);
            if decision.improved {
                checkpoint_writes += 1;
            }
            if decision.stop {
                break;
            }
        }

        // One improving epoch, then 51 non-improving ones exhaust patience.
        assert_eq!(checkpoint_writes, 1);
        assert_eq!(session.best_val_loss(), 0.95);
        assert_eq!(epochs_run, 52);
    }

    #[test]
    fn test_steady_improvement_never_stops() {
        let mut session = EarlyStopping::new();
        let losses = [1.0, 0.9, 0.8, 0.7, 0.6];

        let mut checkpoint_writes = 0;
        for loss in losses {
            let decision = session.observe(loss);
            assert!(decision.improved);
            assert!(!decision.stop);
            checkpoint_writes += 1;
        }

        assert_eq!(checkpoint_writes, losses.len());
        assert_eq!(session.best_val_loss(), 0.6);
    }

    #[test]
    fn test_checkpoint_tracks_best_under_relative_rule() {
        let mut session = EarlyStopping::new();

        // 0.92 is within 0.99x of 0.93: strictly lower, but not an
        // improvement under the relative rule, so the best stays at 0.93.
        let losses = [1.0, 0.93, 0.92];
        let mut last_written = None;
        for loss in losses {
            if session.observe(loss).improved {
                last_written = Some(loss);
            }
        }

        assert_eq!(last_written, Some(0.93));
        assert_eq!(session.best_val_loss(), 0.93);
        assert_eq!(session.patience(), 1);
    }
}
