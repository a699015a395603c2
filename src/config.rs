use crate::constants::{file, inference, network, noise, training};
use crate::data::noise::NoiseInterval;
use crate::error::{FfdnetError, Result};
use std::fmt;
use std::path::PathBuf;

/// Whether images are processed as single-channel luma or three-channel RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
	Gray,
	Rgb,
}

impl ColorMode {
	pub fn from_is_gray(is_gray: bool) -> Self {
		if is_gray {
			ColorMode::Gray
		} else {
			ColorMode::Rgb
		}
	}

	pub fn is_gray(self) -> bool {
		self == ColorMode::Gray
	}

	pub fn channels(self) -> usize {
		match self {
			ColorMode::Gray => network::GRAY_CHANNELS,
			ColorMode::Rgb => network::RGB_CHANNELS,
		}
	}

	/// Sub-directory of the training root holding images of this mode.
	pub fn dir_name(self) -> &'static str {
		match self {
			ColorMode::Gray => file::GRAY_DIR,
			ColorMode::Rgb => file::RGB_DIR,
		}
	}

	pub fn checkpoint_name(self) -> &'static str {
		match self {
			ColorMode::Gray => file::GRAY_CHECKPOINT,
			ColorMode::Rgb => file::RGB_CHECKPOINT,
		}
	}
}

impl fmt::Display for ColorMode {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			ColorMode::Gray => write!(f, "gray"),
			ColorMode::Rgb => write!(f, "rgb"),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
	pub color: ColorMode,
	pub features: usize,
	pub depth: usize,
}

impl NetworkConfig {
	/// Published FFDNet sizes for the given mode.
	pub fn for_mode(color: ColorMode) -> Self {
		match color {
			ColorMode::Gray => Self {
				color,
				features: network::DEFAULT_GRAY_FEATURES,
				depth: network::DEFAULT_GRAY_DEPTH,
			},
			ColorMode::Rgb => Self {
				color,
				features: network::DEFAULT_RGB_FEATURES,
				depth: network::DEFAULT_RGB_DEPTH,
			},
		}
	}

	pub fn builder(color: ColorMode) -> NetworkConfigBuilder {
		NetworkConfigBuilder {
			color,
			features: None,
			depth: None,
		}
	}

	pub fn channels(&self) -> usize {
		self.color.channels()
	}

	pub fn validate(&self) -> Result<()> {
		if self.features == 0 {
			return Err(FfdnetError::InvalidParameter(
				"Features must be greater than 0".into(),
			));
		}
		if self.depth < network::MIN_DEPTH {
			return Err(FfdnetError::InvalidParameter(format!(
				"Depth ({}) must be at least {}",
				self.depth,
				network::MIN_DEPTH
			)));
		}
		Ok(())
	}
}

pub struct NetworkConfigBuilder {
	color: ColorMode,
	features: Option<usize>,
	depth: Option<usize>,
}

impl NetworkConfigBuilder {
	pub fn features(mut self, features: usize) -> Self {
		self.features = Some(features);
		self
	}

	pub fn depth(mut self, depth: usize) -> Self {
		self.depth = Some(depth);
		self
	}

	pub fn build(self) -> NetworkConfig {
		let defaults = NetworkConfig::for_mode(self.color);
		NetworkConfig {
			color: self.color,
			features: self.features.unwrap_or(defaults.features),
			depth: self.depth.unwrap_or(defaults.depth),
		}
	}
}

#[derive(Debug, Clone)]
pub struct TrainingConfig {
	pub train_path: PathBuf,
	pub patch_size: usize,
	pub patch_stride: usize,
	pub train_noise: NoiseInterval,
	pub val_noise: NoiseInterval,
	pub batch_size: usize,
	pub epochs: usize,
	pub val_epoch: usize,
	pub learning_rate: f32,
	pub save_checkpoints: usize,
	pub prefetch: usize,
	pub seed: Option<u64>,
	pub show_progress: bool,
}

impl Default for TrainingConfig {
	fn default() -> Self {
		TrainingConfig::builder().build()
	}
}

impl TrainingConfig {
	pub fn builder() -> TrainingConfigBuilder {
		TrainingConfigBuilder::default()
	}

	pub fn validate(&self) -> Result<()> {
		if self.patch_size == 0 {
			return Err(FfdnetError::InvalidParameter(format!(
				"Patch size ({}) must be greater than 0",
				self.patch_size
			)));
		}
		if self.patch_size % network::DOWNSCALE_FACTOR != 0 {
			return Err(FfdnetError::InvalidParameter(format!(
				"Patch size ({}) must be even",
				self.patch_size
			)));
		}
		if self.patch_stride == 0 {
			return Err(FfdnetError::InvalidParameter(format!(
				"Patch stride ({}) must be greater than 0",
				self.patch_stride
			)));
		}
		if self.batch_size == 0 {
			return Err(FfdnetError::InvalidParameter(format!(
				"Batch size ({}) must be greater than 0",
				self.batch_size
			)));
		}
		if self.val_epoch == 0 {
			return Err(FfdnetError::InvalidParameter(
				"Validation epoch interval must be greater than 0".into(),
			));
		}
		if self.save_checkpoints == 0 {
			return Err(FfdnetError::InvalidParameter(
				"Checkpoint interval must be greater than 0".into(),
			));
		}
		if !(self.learning_rate > 0.0) {
			return Err(FfdnetError::InvalidParameter(format!(
				"Learning rate ({}) must be greater than 0",
				self.learning_rate
			)));
		}
		self.train_noise.validate()?;
		self.val_noise.validate()?;
		Ok(())
	}
}

#[derive(Default)]
pub struct TrainingConfigBuilder {
	train_path: Option<PathBuf>,
	patch_size: Option<usize>,
	patch_stride: Option<usize>,
	train_noise: Option<NoiseInterval>,
	val_noise: Option<NoiseInterval>,
	batch_size: Option<usize>,
	epochs: Option<usize>,
	val_epoch: Option<usize>,
	learning_rate: Option<f32>,
	save_checkpoints: Option<usize>,
	prefetch: Option<usize>,
	seed: Option<u64>,
	show_progress: Option<bool>,
}

impl TrainingConfigBuilder {
	pub fn train_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.train_path = Some(path.into());
		self
	}

	pub fn patch_size(mut self, size: usize) -> Self {
		self.patch_size = Some(size);
		self
	}

	pub fn patch_stride(mut self, stride: usize) -> Self {
		self.patch_stride = Some(stride);
		self
	}

	pub fn train_noise(mut self, interval: NoiseInterval) -> Self {
		self.train_noise = Some(interval);
		self
	}

	pub fn val_noise(mut self, interval: NoiseInterval) -> Self {
		self.val_noise = Some(interval);
		self
	}

	pub fn batch_size(mut self, size: usize) -> Self {
		self.batch_size = Some(size);
		self
	}

	pub fn epochs(mut self, epochs: usize) -> Self {
		self.epochs = Some(epochs);
		self
	}

	pub fn val_epoch(mut self, val_epoch: usize) -> Self {
		self.val_epoch = Some(val_epoch);
		self
	}

	pub fn learning_rate(mut self, rate: f32) -> Self {
		self.learning_rate = Some(rate);
		self
	}

	pub fn save_checkpoints(mut self, interval: usize) -> Self {
		self.save_checkpoints = Some(interval);
		self
	}

	pub fn prefetch(mut self, depth: usize) -> Self {
		self.prefetch = Some(depth);
		self
	}

	pub fn seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	pub fn show_progress(mut self, show: bool) -> Self {
		self.show_progress = Some(show);
		self
	}

	pub fn build(self) -> TrainingConfig {
		let patch_size = self.patch_size.unwrap_or(training::DEFAULT_PATCH_SIZE);
		TrainingConfig {
			train_path: self
				.train_path
				.unwrap_or_else(|| PathBuf::from(training::DEFAULT_TRAIN_PATH)),
			patch_size,
			patch_stride: self.patch_stride.unwrap_or(patch_size),
			train_noise: self
				.train_noise
				.unwrap_or_else(|| NoiseInterval::from_cli(training::DEFAULT_TRAIN_NOISE_INTERVAL)),
			val_noise: self
				.val_noise
				.unwrap_or_else(|| NoiseInterval::from_cli(training::DEFAULT_VAL_NOISE_INTERVAL)),
			batch_size: self.batch_size.unwrap_or(training::DEFAULT_BATCH_SIZE),
			epochs: self.epochs.unwrap_or(training::DEFAULT_EPOCHS),
			val_epoch: self.val_epoch.unwrap_or(training::DEFAULT_VAL_EPOCH),
			learning_rate: self.learning_rate.unwrap_or(training::DEFAULT_LEARNING_RATE),
			save_checkpoints: self.save_checkpoints.unwrap_or(training::DEFAULT_SAVE_CHECKPOINTS),
			prefetch: self.prefetch.unwrap_or(training::DEFAULT_PREFETCH),
			seed: self.seed,
			show_progress: self.show_progress.unwrap_or(true),
		}
	}
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
	pub test_path: PathBuf,
	pub output_path: PathBuf,
	/// Normalised to [0, 1].
	pub noise_sigma: f32,
	pub add_noise: bool,
	pub seed: Option<u64>,
	pub show_progress: bool,
}

impl Default for InferenceConfig {
	fn default() -> Self {
		InferenceConfig {
			test_path: PathBuf::from(inference::DEFAULT_TEST_PATH),
			output_path: PathBuf::from(inference::DEFAULT_OUTPUT_PATH),
			noise_sigma: inference::DEFAULT_NOISE_SIGMA / noise::PIXEL_SCALE,
			add_noise: false,
			seed: None,
			show_progress: true,
		}
	}
}

impl InferenceConfig {
	/// Sets the noise level from a value on the 0-255 pixel scale.
	pub fn with_pixel_sigma(mut self, sigma: f32) -> Self {
		self.noise_sigma = sigma / noise::PIXEL_SCALE;
		self
	}

	pub fn validate(&self) -> Result<()> {
		if !(0.0..=1.0).contains(&self.noise_sigma) {
			return Err(FfdnetError::InvalidParameter(format!(
				"Noise sigma ({}) must lie in [0, {}]",
				self.noise_sigma * noise::PIXEL_SCALE,
				noise::PIXEL_SCALE
			)));
		}
		Ok(())
	}
}

/// Everything one invocation needs, threaded explicitly into each component.
#[derive(Debug, Clone)]
pub struct RunConfig {
	pub is_train: bool,
	pub is_test: bool,
	pub use_gpu: bool,
	pub threads: Option<usize>,
	pub model_path: PathBuf,
	pub network: NetworkConfig,
	pub training: TrainingConfig,
	pub inference: InferenceConfig,
}

impl RunConfig {
	pub fn new(color: ColorMode) -> Self {
		RunConfig {
			is_train: false,
			is_test: false,
			use_gpu: false,
			threads: None,
			model_path: PathBuf::from(file::MODEL_DIR),
			network: NetworkConfig::for_mode(color),
			training: TrainingConfig::default(),
			inference: InferenceConfig::default(),
		}
	}

	pub fn color(&self) -> ColorMode {
		self.network.color
	}

	pub fn validate(&self) -> Result<()> {
		if !(self.is_train || self.is_test) {
			return Err(FfdnetError::Config(
				"At least one of --is_train or --is_test must be set".into(),
			));
		}
		if let Some(0) = self.threads {
			return Err(FfdnetError::InvalidParameter(
				"Thread count must be greater than 0".into(),
			));
		}
		self.network.validate()?;
		if self.is_train {
			self.training.validate()?;
		}
		if self.is_test {
			self.inference.validate()?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn neither_train_nor_test_is_rejected() {
		let config = RunConfig::new(ColorMode::Gray);
		match config.validate() {
			Err(FfdnetError::Config(msg)) => assert!(msg.contains("--is_train")),
			other => panic!("Expected Config error, got {:?}", other),
		}
	}

	#[test]
	fn stride_defaults_to_patch_size() {
		let config = TrainingConfig::builder().patch_size(40).build();
		assert_eq!(config.patch_stride, 40);
	}

	#[test]
	fn odd_patch_size_is_rejected() {
		let config = TrainingConfig::builder().patch_size(33).build();
		assert!(config.validate().is_err());
	}

	#[test]
	fn network_builder_falls_back_to_mode_defaults() {
		let config = NetworkConfig::builder(ColorMode::Rgb).depth(5).build();
		assert_eq!(config.features, network::DEFAULT_RGB_FEATURES);
		assert_eq!(config.depth, 5);
		assert_eq!(config.channels(), 3);
	}

	#[test]
	fn pixel_sigma_is_normalised() {
		let config = InferenceConfig::default().with_pixel_sigma(51.0);
		assert!((config.noise_sigma - 0.2).abs() < 1e-6);
		assert!(config.validate().is_ok());

		let config = InferenceConfig::default().with_pixel_sigma(300.0);
		assert!(config.validate().is_err());
	}
}
