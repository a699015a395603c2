use crate::error::{FfdnetError, Result};
use ndarray::{Array4, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Arc;
use std::thread;

/// Stacked `N x C x P x P` patches shared between the loop and the prefetch thread.
#[derive(Clone, Debug)]
pub struct PatchDataset {
	patches: Arc<Array4<f32>>,
}

impl PatchDataset {
	pub fn new(patches: Array4<f32>) -> Self {
		PatchDataset {
			patches: Arc::new(patches),
		}
	}

	pub fn len(&self) -> usize {
		self.patches.len_of(Axis(0))
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn patches(&self) -> &Array4<f32> {
		&self.patches
	}
}

/// Splits a dataset into batches, optionally reshuffled each epoch and prefetched on a worker thread.
#[derive(Debug)]
pub struct BatchLoader {
	dataset: PatchDataset,
	batch_size: usize,
	shuffle: bool,
	prefetch: usize,
}

impl BatchLoader {
	pub fn new(dataset: PatchDataset, batch_size: usize, shuffle: bool, prefetch: usize) -> Result<Self> {
		if batch_size == 0 {
			return Err(FfdnetError::InvalidParameter("Batch size must be greater than 0".into()));
		}
		Ok(BatchLoader {
			dataset,
			batch_size,
			shuffle,
			prefetch,
		})
	}

	/// Number of batches per epoch; a trailing partial batch counts.
	pub fn len(&self) -> usize {
		(self.dataset.len() + self.batch_size - 1) / self.batch_size
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn dataset(&self) -> &PatchDataset {
		&self.dataset
	}

	pub fn epoch<R: Rng + ?Sized>(&self, rng: &mut R) -> Batches {
		let mut order: Vec<usize> = (0..self.dataset.len()).collect();
		if self.shuffle {
			order.shuffle(rng);
		}
		let remaining = self.len();

		if self.prefetch == 0 {
			return Batches {
				source: BatchSource::Inline {
					patches: self.dataset.patches.clone(),
					order,
					batch_size: self.batch_size,
					position: 0,
				},
				remaining,
			};
		}

		let (sender, receiver) = sync_channel(self.prefetch);
		let patches = self.dataset.patches.clone();
		let batch_size = self.batch_size;
		thread::spawn(move || {
			for indices in order.chunks(batch_size) {
				if sender.send(patches.select(Axis(0), indices)).is_err() {
					// consumer went away mid-epoch
					break;
				}
			}
		});

		Batches {
			source: BatchSource::Prefetched(receiver),
			remaining,
		}
	}
}

enum BatchSource {
	Inline {
		patches: Arc<Array4<f32>>,
		order: Vec<usize>,
		batch_size: usize,
		position: usize,
	},
	Prefetched(Receiver<Array4<f32>>),
}

/// One epoch's worth of batches.
pub struct Batches {
	source: BatchSource,
	remaining: usize,
}

impl Iterator for Batches {
	type Item = Array4<f32>;

	fn next(&mut self) -> Option<Array4<f32>> {
		let batch = match &mut self.source {
			BatchSource::Inline {
				patches,
				order,
				batch_size,
				position,
			} => {
				if *position >= order.len() {
					return None;
				}
				let end = (*position + *batch_size).min(order.len());
				let batch = patches.select(Axis(0), &order[*position..end]);
				*position = end;
				Some(batch)
			},
			BatchSource::Prefetched(receiver) => receiver.recv().ok(),
		};
		if batch.is_some() {
			self.remaining = self.remaining.saturating_sub(1);
		}
		batch
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}
