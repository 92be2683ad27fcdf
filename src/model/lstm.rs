//! LSTM surrogate model.
//!
//! The network itself is entirely `tch::nn`: a (optionally bidirectional,
//! optionally stacked) LSTM followed by a per-timestep linear head mapping
//! the hidden state onto the target channels.

use tch::nn::{self, RNN};
use tch::{Reduction, Tensor};

/// LSTM hyperparameters.
#[derive(Debug, Clone)]
pub struct LstmConfig {
    /// Number of input channels per time step
    pub input_size: i64,
    /// Hidden state size
    pub hidden_size: i64,
    /// Number of stacked LSTM layers
    pub num_layers: i64,
    /// Number of predicted channels per time step
    pub output_size: i64,
    /// Run the sequence in both directions
    pub bidirectional: bool,
    /// Dropout between stacked layers
    pub dropout: f64,
}

impl Default for LstmConfig {
    fn default() -> Self {
        Self {
            input_size: 4,
            hidden_size: 64,
            num_layers: 2,
            output_size: 3,
            bidirectional: false,
            dropout: 0.0,
        }
    }
}

/// LSTM mapping an input window to a target window of the same length.
#[derive(Debug)]
pub struct WaveLstm {
    lstm: nn::LSTM,
    head: nn::Linear,
    config: LstmConfig,
}

impl WaveLstm {
    /// Register the model's parameters under the given var-store path.
    pub fn new(vs: &nn::Path, config: LstmConfig) -> Self {
        let rnn_config = nn::RNNConfig {
            num_layers: config.num_layers,
            dropout: config.dropout,
            bidirectional: config.bidirectional,
            batch_first: true,
            ..Default::default()
        };

        let lstm = nn::lstm(vs / "lstm", config.input_size, config.hidden_size, rnn_config);

        let directions = if config.bidirectional { 2 } else { 1 };
        let head = nn::linear(
            vs / "head",
            config.hidden_size * directions,
            config.output_size,
            Default::default(),
        );

        Self { lstm, head, config }
    }

    /// Forward pass.
    ///
    /// # Arguments
    /// * `x` - Input tensor of shape `(batch, window, input_size)`
    ///
    /// # Returns
    /// Output tensor of shape `(batch, window, output_size)`
    pub fn forward(&self, x: &Tensor) -> Tensor {
        let (hidden, _state) = self.lstm.seq(x);
        hidden.apply(&self.head)
    }

    /// Mean-squared error against a target window batch.
    pub fn mse(&self, prediction: &Tensor, target: &Tensor) -> Tensor {
        prediction.mse_loss(target, Reduction::Mean)
    }

    pub fn config(&self) -> &LstmConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{nn::VarStore, Device, Kind, Tensor};

    #[test]
    fn test_forward_shapes() {
        let vs = VarStore::new(Device::Cpu);
        let model = WaveLstm::new(&vs.root(), LstmConfig::default());

        let x = Tensor::zeros([2, 10, 4], (Kind::Float, Device::Cpu));
        let y = model.forward(&x);

        assert_eq!(y.size(), vec![2, 10, 3]);
    }

    #[test]
    fn test_forward_shapes_bidirectional() {
        let config = LstmConfig {
            bidirectional: true,
            ..Default::default()
        };
        let vs = VarStore::new(Device::Cpu);
        let model = WaveLstm::new(&vs.root(), config);

        let x = Tensor::zeros([1, 6, 4], (Kind::Float, Device::Cpu));
        let y = model.forward(&x);

        assert_eq!(y.size(), vec![1, 6, 3]);
    }

    #[test]
    fn test_mse_is_zero_for_identical_tensors() {
        let vs = VarStore::new(Device::Cpu);
        let model = WaveLstm::new(&vs.root(), LstmConfig::default());

        let t = Tensor::ones([2, 5, 3], (Kind::Float, Device::Cpu));
        let loss = model.mse(&t, &t);

        assert!(loss.double_value(&[]).abs() < 1e-12);
    }
}
