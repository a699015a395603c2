pub mod network {
	pub const GRAY_CHANNELS: usize = 1;
	pub const RGB_CHANNELS: usize = 3;
	pub const DEFAULT_GRAY_FEATURES: usize = 64;
	pub const DEFAULT_GRAY_DEPTH: usize = 15;
	pub const DEFAULT_RGB_FEATURES: usize = 96;
	pub const DEFAULT_RGB_DEPTH: usize = 12;
	pub const MIN_DEPTH: usize = 3;
	pub const DOWNSCALE_FACTOR: usize = 2;
	pub const KERNEL_SIZE: usize = 3;
	pub const PADDING: usize = 1;
	pub const BATCH_NORM_EPSILON: f64 = 1e-5;
	pub const BATCH_NORM_MOMENTUM: f64 = 0.1;
	/// Standard deviation of the prediction layer's initial weights.
	pub const PREDICTION_LAYER_INIT_STD: f64 = 0.01;
}

pub mod training {
	pub const DEFAULT_TRAIN_PATH: &str = "./train_data/";
	pub const DEFAULT_PATCH_SIZE: usize = 32;
	pub const DEFAULT_TRAIN_NOISE_INTERVAL: [u32; 3] = [0, 75, 15];
	pub const DEFAULT_VAL_NOISE_INTERVAL: [u32; 3] = [0, 60, 30];
	pub const DEFAULT_BATCH_SIZE: usize = 256;
	pub const DEFAULT_EPOCHS: usize = 80;
	pub const DEFAULT_VAL_EPOCH: usize = 5;
	pub const DEFAULT_LEARNING_RATE: f32 = 1e-3;
	pub const DEFAULT_SAVE_CHECKPOINTS: usize = 5;
	pub const DEFAULT_PREFETCH: usize = 2;
	pub const ADAM_BETA1: f32 = 0.9;
	pub const ADAM_BETA2: f32 = 0.999;
	pub const ADAM_EPSILON: f32 = 1e-8;
}

pub mod inference {
	pub const DEFAULT_TEST_PATH: &str = "./test_data/";
	pub const DEFAULT_OUTPUT_PATH: &str = "./outputs/";
	pub const DEFAULT_NOISE_SIGMA: f32 = 25.0;
}

pub mod noise {
	/// Noise levels are configured on the 8-bit pixel scale.
	pub const PIXEL_SCALE: f32 = 255.0;
}

pub mod file {
	pub const MODEL_DIR: &str = "./models/";
	pub const GRAY_CHECKPOINT: &str = "net_gray.pth";
	pub const RGB_CHECKPOINT: &str = "net_rgb.pth";
	pub const GRAY_DIR: &str = "gray";
	pub const RGB_DIR: &str = "rgb";
	pub const TRAIN_DIR: &str = "train";
	pub const VAL_DIR: &str = "val";
	pub const PNG_EXTENSION: &str = "png";
	pub const NOISY_SUFFIX: &str = "_noisy";
}

pub mod codec {
	pub const XZ_LEVEL: u32 = 7;
}
