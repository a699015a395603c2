pub mod train;

pub use self::test::test;
pub use self::train::train;

use crate::cli;
use crate::config::RunConfig;
use crate::config_file::ConfigFile;
use crate::constants::noise::PIXEL_SCALE;
use crate::device::{select_device, CpuBackend, Device};
use crate::error::Result;
use burn::backend::ndarray::NdArrayDevice;
use burn::backend::Autodiff;
use burn::tensor::backend::Backend;
use clap::ArgMatches;
use log::info;

/// Entry point behind the binary: parse, validate, then train and/or test.
pub fn run(app_m: &ArgMatches) -> Result<()> {
	let config = cli::parse_run_config(app_m)?;

	if let Some(path) = app_m.value_of("WRITE_CONFIG") {
		ConfigFile::from_run_config(&config).to_toml_file(path)?;
		info!("Wrote configuration to {}", path);
		if !(config.is_train || config.is_test) {
			return Ok(());
		}
	}

	config.validate()?;
	print_run_info(&config);

	match select_device(config.use_gpu, config.threads)? {
		Device::Cpu { .. } => run_on::<CpuBackend>(&config, &NdArrayDevice::Cpu),
		#[cfg(feature = "gpu")]
		Device::Gpu(ref device) => run_on::<crate::device::GpuBackend>(&config, device),
	}
}

/// Trains on the autodiff wrapper of `B`, then tests on `B` itself.
fn run_on<B: Backend>(config: &RunConfig, device: &B::Device) -> Result<()> {
	if config.is_train {
		train::<Autodiff<B>>(config, device)?;
	}
	if config.is_test {
		test::<B>(config, device)?;
	}
	Ok(())
}

fn print_run_info(config: &RunConfig) {
	let network = &config.network;
	info!("Parameters:");
	info!("  mode: {}{}", if config.is_train { "train " } else { "" }, if config.is_test { "test" } else { "" });
	info!("  color: {}", network.color);
	info!("  features: {}, depth: {}", network.features, network.depth);
	info!("  model_path: {}", config.model_path.display());
	info!("  use_gpu: {}", config.use_gpu);
	if config.is_train {
		let t = &config.training;
		info!("  train_path: {}", t.train_path.display());
		info!("  patch_size: {}, patch_stride: {}", t.patch_size, t.patch_stride);
		info!("  train_noise_interval: {}", t.train_noise);
		info!("  val_noise_interval: {}", t.val_noise);
		info!("  batch_size: {}, epoches: {}", t.batch_size, t.epochs);
		info!("  val_epoch: {}, save_checkpoints: {}", t.val_epoch, t.save_checkpoints);
		info!("  learning_rate: {}", t.learning_rate);
	}
	if config.is_test {
		let i = &config.inference;
		info!("  test_path: {}", i.test_path.display());
		info!("  output_path: {}", i.output_path.display());
		info!("  noise_sigma: {}, add_noise: {}", i.noise_sigma * PIXEL_SCALE, i.add_noise);
	}
}
