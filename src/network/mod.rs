pub mod ffdnet;
pub mod shuffle;

pub use self::ffdnet::{DenoiseBlock, FfdNet};

use crate::config::NetworkConfig;
use crate::error::Result;
use crate::training::checkpoint;
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use std::path::Path;

/// The operations training and inference need from a denoiser.
///
/// `forward` takes a batch of noisy images `N x C x W x H` and one normalised noise
/// level per item, and returns the denoised batch with the same shape.
///
/// A module on an autodiff backend is in train mode: BatchNorm uses batch
/// statistics and updates its running estimates. `AutodiffModule::valid` gives the
/// eval-mode counterpart, which uses the running estimates and records no graph.
pub trait DenoisingNetwork<B: Backend>: Module<B> + Sized {
	fn config(&self) -> NetworkConfig;

	fn forward(&self, noisy: Tensor<B, 4>, noise_levels: Tensor<B, 1>) -> Result<Tensor<B, 4>>;

	/// Number of scalars held by the module.
	fn parameters(&self) -> usize {
		self.num_params()
	}

	fn is_training(&self) -> bool {
		B::ad_enabled()
	}

	fn save(&self, path: &Path) -> Result<()> {
		checkpoint::save_network(path, self)
	}

	/// Restores weights written by [`DenoisingNetwork::save`] into this module.
	fn load(self, path: &Path, device: &B::Device) -> Result<Self> {
		checkpoint::load_network(path, self, device)
	}
}
