use super::shuffle::{noise_map, pixel_shuffle, pixel_unshuffle};
use super::DenoisingNetwork;
use crate::config::{ColorMode, NetworkConfig};
use crate::constants::network::{
	BATCH_NORM_EPSILON, BATCH_NORM_MOMENTUM, DOWNSCALE_FACTOR, GRAY_CHANNELS, KERNEL_SIZE, PADDING,
	PREDICTION_LAYER_INIT_STD,
};
use crate::error::{FfdnetError, Result};
use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Initializer, PaddingConfig2d, Relu};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

const SUBPIXELS: usize = DOWNSCALE_FACTOR * DOWNSCALE_FACTOR;

fn kaiming() -> Initializer {
	Initializer::KaimingNormal {
		gain: std::f64::consts::SQRT_2,
		fan_out_only: false,
	}
}

fn conv3x3<B: Backend>(input: usize, output: usize, initializer: Initializer, device: &B::Device) -> Conv2d<B> {
	Conv2dConfig::new([input, output], [KERNEL_SIZE, KERNEL_SIZE])
		.with_padding(PaddingConfig2d::Explicit(PADDING, PADDING))
		.with_initializer(initializer)
		.init(device)
}

/// Conv3x3, BatchNorm and ReLU over the half-resolution feature maps.
#[derive(Module, Debug)]
pub struct DenoiseBlock<B: Backend> {
	conv: Conv2d<B>,
	norm: BatchNorm<B, 2>,
	activation: Relu,
}

impl<B: Backend> DenoiseBlock<B> {
	pub fn new(features: usize, device: &B::Device) -> Self {
		DenoiseBlock {
			conv: conv3x3(features, features, kaiming(), device),
			norm: BatchNormConfig::new(features)
				.with_epsilon(BATCH_NORM_EPSILON)
				.with_momentum(BATCH_NORM_MOMENTUM)
				.init(device),
			activation: Relu::new(),
		}
	}

	pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
		self.activation.forward(self.norm.forward(self.conv.forward(input)))
	}
}

/// FFDNet: a residual denoiser working on a half-resolution sub-image stack
/// conditioned on a per-item noise map.
#[derive(Module, Debug)]
pub struct FfdNet<B: Backend> {
	head: Conv2d<B>,
	body: Vec<DenoiseBlock<B>>,
	tail: Conv2d<B>,
	activation: Relu,
	channels: usize,
	features: usize,
}

impl<B: Backend> FfdNet<B> {
	pub fn new(config: &NetworkConfig, device: &B::Device) -> Result<Self> {
		config.validate()?;
		let channels = config.channels();
		let features = config.features;
		let prediction_init = Initializer::Normal {
			mean: 0.0,
			std: PREDICTION_LAYER_INIT_STD,
		};

		Ok(FfdNet {
			head: conv3x3((SUBPIXELS + 1) * channels, features, kaiming(), device),
			body: (0..config.depth - 2)
				.map(|_| DenoiseBlock::new(features, device))
				.collect(),
			tail: conv3x3(features, SUBPIXELS * channels, prediction_init, device),
			activation: Relu::new(),
			channels,
			features,
		})
	}

	/// Seeds the backend generator first when `seed` is given, so initial weights are reproducible.
	pub fn seeded(config: &NetworkConfig, seed: Option<u64>, device: &B::Device) -> Result<Self> {
		if let Some(seed) = seed {
			B::seed(seed);
		}
		Self::new(config, device)
	}

	fn check_input(&self, dims: [usize; 4], levels: usize) -> Result<()> {
		let [n, c, w, h] = dims;
		if c != self.channels {
			return Err(FfdnetError::InvalidInput(format!(
				"Network expects {}-channel images, got {}",
				self.channels, c
			)));
		}
		if n != levels {
			return Err(FfdnetError::InvalidInput(format!(
				"Got {} noise levels for a batch of {}",
				levels, n
			)));
		}
		if w == 0 || h == 0 || w % DOWNSCALE_FACTOR != 0 || h % DOWNSCALE_FACTOR != 0 {
			return Err(FfdnetError::InvalidInput(format!(
				"Image dimensions must be even and non-zero, got {}x{}",
				w, h
			)));
		}
		Ok(())
	}
}

impl<B: Backend> DenoisingNetwork<B> for FfdNet<B> {
	fn config(&self) -> NetworkConfig {
		NetworkConfig {
			color: ColorMode::from_is_gray(self.channels == GRAY_CHANNELS),
			features: self.features,
			depth: self.body.len() + 2,
		}
	}

	fn forward(&self, noisy: Tensor<B, 4>, noise_levels: Tensor<B, 1>) -> Result<Tensor<B, 4>> {
		let dims = noisy.dims();
		let [levels] = noise_levels.dims();
		self.check_input(dims, levels)?;
		let [_, channels, width, height] = dims;

		let downsampled = pixel_unshuffle(noisy.clone())?;
		let map = noise_map(
			noise_levels,
			channels,
			width / DOWNSCALE_FACTOR,
			height / DOWNSCALE_FACTOR,
		);
		let input = Tensor::cat(vec![downsampled, map], 1);

		let mut hidden = self.activation.forward(self.head.forward(input));
		for block in &self.body {
			hidden = block.forward(hidden);
		}
		let residual = pixel_shuffle(self.tail.forward(hidden))?;

		Ok(noisy - residual)
	}
}
