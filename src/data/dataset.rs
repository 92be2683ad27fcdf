//! Device-resident dataset and batching.

use anyhow::{anyhow, Result};
use ndarray::Array3;
use tch::{Device, Kind, Tensor};

/// Windowed input/target pairs held as tensors on the training device.
pub struct WindowDataset {
    inputs: Tensor,
    targets: Tensor,
}

impl WindowDataset {
    /// Build a dataset from windowed arrays of shape `[n, T, channels]`.
    pub fn new(inputs: &Array3<f64>, targets: &Array3<f64>, device: Device) -> Result<Self> {
        let (n_in, steps_in, c_in) = inputs.dim();
        let (n_tg, steps_tg, c_tg) = targets.dim();
        if n_in != n_tg || steps_in != steps_tg {
            return Err(anyhow!(
                "Input windows are {}x{} but target windows are {}x{}",
                n_in,
                steps_in,
                n_tg,
                steps_tg
            ));
        }

        let input_values: Vec<f64> = inputs.iter().copied().collect();
        let target_values: Vec<f64> = targets.iter().copied().collect();

        let inputs = Tensor::from_slice(&input_values)
            .reshape([n_in as i64, steps_in as i64, c_in as i64])
            .to_kind(Kind::Float)
            .to(device);
        let targets = Tensor::from_slice(&target_values)
            .reshape([n_tg as i64, steps_tg as i64, c_tg as i64])
            .to_kind(Kind::Float)
            .to(device);

        Ok(Self { inputs, targets })
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.inputs.size()[0] as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Window length in time steps.
    pub fn window_len(&self) -> i64 {
        self.inputs.size()[1]
    }

    /// Number of target channels.
    pub fn target_channels(&self) -> i64 {
        self.targets.size()[2]
    }

    /// Select a batch of windows by index.
    pub fn get_batch(&self, indices: &[i64]) -> (Tensor, Tensor) {
        let idx = Tensor::from_slice(indices).to(self.inputs.device());
        (
            self.inputs.index_select(0, &idx),
            self.targets.index_select(0, &idx),
        )
    }
}

/// Index batcher: yields batches of dataset indices, optionally shuffled.
pub struct DataLoader {
    indices: Vec<i64>,
    batch_size: usize,
    shuffle: bool,
    cursor: usize,
}

impl DataLoader {
    pub fn new(len: usize, batch_size: usize, shuffle: bool) -> Self {
        let mut loader = Self {
            indices: (0..len as i64).collect(),
            batch_size: batch_size.max(1),
            shuffle,
            cursor: 0,
        };
        loader.reset();
        loader
    }

    /// Rewind for a new epoch, reshuffling if enabled.
    pub fn reset(&mut self) {
        self.cursor = 0;
        if self.shuffle {
            use rand::seq::SliceRandom;
            self.indices.shuffle(&mut rand::thread_rng());
        }
    }

    pub fn num_batches(&self) -> usize {
        (self.indices.len() + self.batch_size - 1) / self.batch_size
    }
}

impl Iterator for DataLoader {
    type Item = Vec<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.indices.len() {
            return None;
        }

        let end = (self.cursor + self.batch_size).min(self.indices.len());
        let batch = self.indices[self.cursor..end].to_vec();
        self.cursor = end;

        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_loader_batch_counts() {
        let mut loader = DataLoader::new(90, 32, false);
        assert_eq!(loader.num_batches(), 3);

        let batches: Vec<_> = loader.by_ref().collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 32);
        assert_eq!(batches[2].len(), 26);
    }

    #[test]
    fn test_loader_sequential_order_without_shuffle() {
        let loader = DataLoader::new(5, 2, false);
        let flat: Vec<i64> = loader.flatten().collect();
        assert_eq!(flat, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_loader_reset_restarts_iteration() {
        let mut loader = DataLoader::new(4, 4, false);
        assert!(loader.next().is_some());
        assert!(loader.next().is_none());

        loader.reset();
        assert_eq!(loader.next().unwrap().len(), 4);
    }

    #[test]
    fn test_dataset_shapes_and_batching() {
        let inputs = Array3::zeros((6, 4, 3));
        let targets = Array3::zeros((6, 4, 2));
        let dataset = WindowDataset::new(&inputs, &targets, Device::Cpu).unwrap();

        assert_eq!(dataset.len(), 6);
        assert_eq!(dataset.window_len(), 4);
        assert_eq!(dataset.target_channels(), 2);

        let (x, y) = dataset.get_batch(&[0, 2, 4]);
        assert_eq!(x.size(), vec![3, 4, 3]);
        assert_eq!(y.size(), vec![3, 4, 2]);
    }

    #[test]
    fn test_dataset_rejects_mismatched_windows() {
        let inputs = Array3::zeros((6, 4, 3));
        let targets = Array3::zeros((5, 4, 2));
        assert!(WindowDataset::new(&inputs, &targets, Device::Cpu).is_err());
    }
}
