use crate::config::RunConfig;
use crate::config_file::ConfigFile;
use crate::data::NoiseInterval;
use crate::error::{FfdnetError, Result};
use clap::{App, Arg, ArgMatches};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

pub fn build_app() -> App<'static, 'static> {
	App::new("FFDNet")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Trains and runs a fast and flexible image denoising network")
		.arg(build_flag("IS_TRAIN", "is_train", "Train a network"))
		.arg(build_flag("IS_TEST", "is_test", "Denoise the images under --test_path"))
		.arg(build_flag("IS_GRAY", "is_gray", "Process single-channel images instead of RGB"))
		.arg(build_value("TRAIN_PATH", "train_path", "PATH", "Root of the {gray,rgb}/{train,val} dataset. Default: ./train_data/"))
		.arg(build_value("PATCH_SIZE", "patch_size", "SIZE", "Side length of square training patches. Default: 32"))
		.arg(build_value("PATCH_STRIDE", "patch_stride", "STRIDE", "Offset between patches. Default: the patch size"))
		.arg(build_interval_arg("TRAIN_NOISE_INTERVAL", "train_noise_interval", "Training noise levels on the 0-255 scale. Default: 0 75 15"))
		.arg(build_interval_arg("VAL_NOISE_INTERVAL", "val_noise_interval", "Validation noise levels on the 0-255 scale. Default: 0 60 30"))
		.arg(build_value("BATCH_SIZE", "batch_size", "N", "Patches per batch. Default: 256"))
		.arg(build_value("EPOCHES", "epoches", "N", "Number of training epochs. Default: 80"))
		.arg(build_value("VAL_EPOCH", "val_epoch", "N", "Validate and checkpoint every N epochs. Default: 5"))
		.arg(build_value("LEARNING_RATE", "learning_rate", "RATE", "Adam learning rate. Default: 1e-3"))
		.arg(build_value("SAVE_CHECKPOINTS", "save_checkpoints", "N", "Additionally checkpoint every N epochs. Default: 5"))
		.arg(build_value("FEATURES", "features", "N", "Feature maps per hidden layer. Default: 64 gray, 96 rgb"))
		.arg(build_value("DEPTH", "depth", "N", "Number of convolution layers. Default: 15 gray, 12 rgb"))
		.arg(build_value("PREFETCH", "prefetch", "N", "Batches assembled ahead on a worker thread, 0 disables. Default: 2"))
		.arg(build_value("TEST_PATH", "test_path", "PATH", "Image file or directory to denoise. Default: ./test_data/"))
		.arg(build_value("OUTPUT_PATH", "output_path", "PATH", "Directory for denoised images. Default: ./outputs/"))
		.arg(build_value("NOISE_SIGMA", "noise_sigma", "SIGMA", "Noise level on the 0-255 scale used at test time. Default: 25"))
		.arg(build_flag("ADD_NOISE", "add_noise", "Add noise at --noise_sigma before denoising and report PSNR"))
		.arg(build_value("MODEL_PATH", "model_path", "DIR", "Directory holding net_gray.pth / net_rgb.pth. Default: ./models/"))
		.arg(build_flag("USE_GPU", "use_gpu", "Use an accelerator when one is available"))
		.arg(build_value("THREADS", "threads", "N", "Worker threads for the CPU kernels. Default: all cores"))
		.arg(build_value("SEED", "seed", "SEED", "Seed for initialisation, shuffling and noise"))
		.arg(build_value("CONFIG", "config", "FILE", "Read base settings from a TOML or JSON file; flags override it"))
		.arg(build_value("WRITE_CONFIG", "write_config", "FILE", "Write the effective settings to a TOML file"))
		.arg(build_flag("NO_PROGRESS", "no_progress", "Disable progress bars"))
}

pub fn build_cli() -> ArgMatches<'static> {
	build_app().get_matches()
}

fn build_flag(name: &'static str, long: &'static str, help: &'static str) -> Arg<'static, 'static> {
	Arg::with_name(name).long(long).help(help).takes_value(false)
}

fn build_value(
	name: &'static str,
	long: &'static str,
	value_name: &'static str,
	help: &'static str,
) -> Arg<'static, 'static> {
	Arg::with_name(name)
		.long(long)
		.value_name(value_name)
		.help(help)
		.takes_value(true)
		.empty_values(false)
}

fn build_interval_arg(name: &'static str, long: &'static str, help: &'static str) -> Arg<'static, 'static> {
	Arg::with_name(name)
		.long(long)
		.value_names(&["LOW", "HIGH", "STEP"])
		.number_of_values(3)
		.help(help)
}

fn parse_value<T>(app_m: &ArgMatches, name: &str) -> Result<Option<T>>
where
	T: FromStr,
	T::Err: Display,
{
	match app_m.value_of(name) {
		Some(raw) => raw
			.trim()
			.parse()
			.map(Some)
			.map_err(|e| FfdnetError::InvalidParameter(format!("Invalid value '{}' for {}: {}", raw, name, e))),
		None => Ok(None),
	}
}

fn parse_interval(app_m: &ArgMatches, name: &str) -> Result<Option<NoiseInterval>> {
	let values = match app_m.values_of(name) {
		Some(values) => values,
		None => return Ok(None),
	};
	let mut parsed = [0u32; 3];
	for (slot, raw) in parsed.iter_mut().zip(values) {
		*slot = raw.trim().parse()?;
	}
	Ok(Some(NoiseInterval::from_cli(parsed)))
}

/// Builds the effective run configuration: defaults, then `--config`, then explicit flags.
pub fn parse_run_config(app_m: &ArgMatches) -> Result<RunConfig> {
	let base = match app_m.value_of("CONFIG") {
		Some(path) => ConfigFile::from_file(path)?,
		None => ConfigFile::default(),
	};

	// colour mode decides the network defaults, so settle it first
	let mut file = base;
	if app_m.is_present("IS_GRAY") {
		file.network.is_gray = true;
	}
	if let Some(features) = parse_value(app_m, "FEATURES")? {
		file.network.features = Some(features);
	}
	if let Some(depth) = parse_value(app_m, "DEPTH")? {
		file.network.depth = Some(depth);
	}
	let mut config = file.to_run_config();

	config.is_train = app_m.is_present("IS_TRAIN");
	config.is_test = app_m.is_present("IS_TEST");
	config.use_gpu |= app_m.is_present("USE_GPU");
	if let Some(threads) = parse_value(app_m, "THREADS")? {
		config.threads = Some(threads);
	}
	if let Some(path) = app_m.value_of("MODEL_PATH") {
		config.model_path = PathBuf::from(path);
	}

	let training = &mut config.training;
	if let Some(path) = app_m.value_of("TRAIN_PATH") {
		training.train_path = PathBuf::from(path);
	}
	if let Some(size) = parse_value(app_m, "PATCH_SIZE")? {
		// stride follows the patch size unless set on its own
		if training.patch_stride == training.patch_size {
			training.patch_stride = size;
		}
		training.patch_size = size;
	}
	if let Some(stride) = parse_value(app_m, "PATCH_STRIDE")? {
		training.patch_stride = stride;
	}
	if let Some(interval) = parse_interval(app_m, "TRAIN_NOISE_INTERVAL")? {
		training.train_noise = interval;
	}
	if let Some(interval) = parse_interval(app_m, "VAL_NOISE_INTERVAL")? {
		training.val_noise = interval;
	}
	if let Some(size) = parse_value(app_m, "BATCH_SIZE")? {
		training.batch_size = size;
	}
	if let Some(epochs) = parse_value(app_m, "EPOCHES")? {
		training.epochs = epochs;
	}
	if let Some(val_epoch) = parse_value(app_m, "VAL_EPOCH")? {
		training.val_epoch = val_epoch;
	}
	if let Some(rate) = parse_value(app_m, "LEARNING_RATE")? {
		training.learning_rate = rate;
	}
	if let Some(interval) = parse_value(app_m, "SAVE_CHECKPOINTS")? {
		training.save_checkpoints = interval;
	}
	if let Some(depth) = parse_value(app_m, "PREFETCH")? {
		training.prefetch = depth;
	}

	let inference = &mut config.inference;
	if let Some(path) = app_m.value_of("TEST_PATH") {
		inference.test_path = PathBuf::from(path);
	}
	if let Some(path) = app_m.value_of("OUTPUT_PATH") {
		inference.output_path = PathBuf::from(path);
	}
	if let Some(sigma) = parse_value::<f32>(app_m, "NOISE_SIGMA")? {
		*inference = inference.clone().with_pixel_sigma(sigma);
	}
	inference.add_noise |= app_m.is_present("ADD_NOISE");

	if let Some(seed) = parse_value(app_m, "SEED")? {
		config.training.seed = Some(seed);
		config.inference.seed = Some(seed);
	}
	if app_m.is_present("NO_PROGRESS") {
		config.training.show_progress = false;
		config.inference.show_progress = false;
	}

	Ok(config)
}
