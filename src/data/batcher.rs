// ============================================================
// Layer 4: Classification Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec of samples
// into tensors.
//
//   Input:  N samples, each with S token ids and C label slots
//   Output: input_ids [N, S] and labels [N, C]
//
// The builder already fixed every sequence to the same length,
// so batching is a flatten followed by a reshape.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ClassificationSample;

#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    /// Token ids, shape [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// One-hot targets, shape [batch_size, num_labels]
    pub labels: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug)]
pub struct ClassificationBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ClassificationSample, ClassificationBatch<B>> for ClassificationBatcher<B> {
    fn batch(&self, items: Vec<ClassificationSample>) -> ClassificationBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(|s| s.input_ids.len()).unwrap_or(0);
        let num_labels = items.first().map(|s| s.label.len()).unwrap_or(0);

        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.input_ids.iter().map(|&x| x as i32))
            .collect();

        let label_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.label.iter().map(|&x| x as i32))
            .collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(
            input_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(
            label_flat.as_slice(), &self.device
        ).reshape([batch_size, num_labels]);

        ClassificationBatch { input_ids, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_batch_shapes_and_values() {
        let device  = Default::default();
        let batcher = ClassificationBatcher::<TestBackend>::new(device);
        let items = vec![
            ClassificationSample { input_ids: vec![4, 10, 11, 2], label: vec![0, 1] },
            ClassificationSample { input_ids: vec![4, 12, 13, 2], label: vec![1, 0] },
        ];

        let batch = batcher.batch(items);
        assert_eq!(batch.input_ids.dims(), [2, 4]);
        assert_eq!(batch.labels.dims(), [2, 2]);

        let ids: Vec<i64> = batch.input_ids.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(ids, vec![4, 10, 11, 2, 4, 12, 13, 2]);
        let labels: Vec<i64> = batch.labels.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(labels, vec![0, 1, 1, 0]);
    }
}
