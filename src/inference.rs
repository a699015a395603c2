use crate::config::InferenceConfig;
use crate::constants::file::{NOISY_SUFFIX, PNG_EXTENSION};
use crate::constants::noise::PIXEL_SCALE;
use crate::data::{add_noise, list_files, noise_levels_for_batch, read_image, write_image};
use crate::device::{to_device_batch, to_device_levels, to_host};
use crate::error::{FfdnetError, Result};
use crate::logging::{create_progress_bar, OperationLogger};
use crate::network::DenoisingNetwork;
use crate::psnr::psnr;
use burn::tensor::backend::Backend;
use log::info;
use ndarray::{Array3, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Columns and rows appended by [`pad_to_even`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
	pub width: usize,
	pub height: usize,
}

/// Duplicates the last column and/or row so both spatial dimensions are even.
pub fn pad_to_even(image: &Array3<f32>) -> Result<(Array3<f32>, Padding)> {
	let (_, w, h) = image.dim();
	let padding = Padding {
		width: w % 2,
		height: h % 2,
	};

	let mut padded = image.clone();
	if padding.width == 1 {
		padded = ndarray::concatenate(Axis(1), &[padded.view(), padded.slice(s![.., w - 1..w, ..])])?;
	}
	if padding.height == 1 {
		padded = ndarray::concatenate(Axis(2), &[padded.view(), padded.slice(s![.., .., h - 1..h])])?;
	}
	Ok((padded, padding))
}

/// Removes what [`pad_to_even`] added.
pub fn crop_padding(image: &Array3<f32>, padding: Padding) -> Array3<f32> {
	let (_, w, h) = image.dim();
	image
		.slice(s![.., ..w - padding.width, ..h - padding.height])
		.to_owned()
}

/// A single file, or every file directly inside a directory in name order.
pub fn collect_inputs(path: &Path) -> Result<Vec<PathBuf>> {
	if path.is_file() {
		Ok(vec![path.to_path_buf()])
	} else if path.is_dir() {
		let files = list_files(path)?;
		if files.is_empty() {
			return Err(FfdnetError::EmptyDataset(format!(
				"No images found in {}",
				path.display()
			)));
		}
		Ok(files)
	} else {
		Err(FfdnetError::FileNotFound(path.to_path_buf()))
	}
}

#[derive(Debug, Clone)]
pub struct ImageReport {
	pub input: PathBuf,
	pub output: PathBuf,
	pub noisy_output: Option<PathBuf>,
	pub width: usize,
	pub height: usize,
	pub psnr_noisy: Option<f32>,
	pub psnr_denoised: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct InferenceReport {
	pub images: Vec<ImageReport>,
	pub elapsed: Duration,
}

impl InferenceReport {
	/// Mean `(noisy, denoised)` PSNR over images that were noised, skipping infinite values.
	pub fn average_psnr(&self) -> Option<(f32, f32)> {
		let pairs: Vec<(f32, f32)> = self
			.images
			.iter()
			.filter_map(|r| match (r.psnr_noisy, r.psnr_denoised) {
				(Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((a, b)),
				_ => None,
			})
			.collect();
		if pairs.is_empty() {
			return None;
		}
		let n = pairs.len() as f32;
		let (a, b) = pairs.iter().fold((0.0, 0.0), |acc, p| (acc.0 + p.0, acc.1 + p.1));
		Some((a / n, b / n))
	}
}

/// `<file name><suffix>.png`, keeping the input's extension so `a.png` and `a.bmp`
/// in one directory get distinct outputs.
fn output_name(input: &Path, suffix: &str) -> PathBuf {
	let name = input
		.file_name()
		.map(|s| s.to_string_lossy().into_owned())
		.unwrap_or_else(|| "image".to_string());
	PathBuf::from(format!("{}{}.{}", name, suffix, PNG_EXTENSION))
}

/// Denoises images from disk with a trained network in eval mode.
pub struct InferenceDriver<B: Backend, N: DenoisingNetwork<B>> {
	network: N,
	device: B::Device,
	config: InferenceConfig,
	rng: StdRng,
	backend: PhantomData<B>,
}

impl<B: Backend, N: DenoisingNetwork<B>> InferenceDriver<B, N> {
	/// Refuses a module that still tracks gradients; pass `AutodiffModule::valid()` instead.
	pub fn new(network: N, device: &B::Device, config: InferenceConfig) -> Result<Self> {
		if network.is_training() {
			return Err(FfdnetError::InvalidInput(
				"Inference needs an eval-mode network without gradient tracking".into(),
			));
		}
		let rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};
		Ok(InferenceDriver {
			network,
			device: device.clone(),
			config,
			rng,
			backend: PhantomData,
		})
	}

	pub fn network(&self) -> &N {
		&self.network
	}

	/// Runs one `C x W x H` image of any size through the network at noise level `sigma`.
	pub fn denoise(&mut self, image: &Array3<f32>, sigma: f32) -> Result<Array3<f32>> {
		let (padded, padding) = pad_to_even(image)?;
		let batch = to_device_batch::<B>(&padded.insert_axis(Axis(0)), &self.device);
		let levels = to_device_levels::<B>(&noise_levels_for_batch(1, sigma), &self.device);
		let output = to_host(self.network.forward(batch, levels)?)?;
		let denoised = output.index_axis_move(Axis(0), 0);
		Ok(crop_padding(&denoised, padding))
	}

	pub fn process(&mut self, input: &Path) -> Result<ImageReport> {
		let color = self.network.config().color;
		let clean = read_image(input, color)?;
		let (_, width, height) = clean.dim();
		let sigma = self.config.noise_sigma;

		let noisy = if self.config.add_noise {
			add_noise(&clean, sigma, &mut self.rng)?
		} else {
			clean.clone()
		};
		let denoised = self.denoise(&noisy, sigma)?;

		let output = self.config.output_path.join(output_name(input, ""));
		write_image(&output, denoised.view())?;

		let mut report = ImageReport {
			input: input.to_path_buf(),
			output,
			noisy_output: None,
			width,
			height,
			psnr_noisy: None,
			psnr_denoised: None,
		};

		if self.config.add_noise {
			let noisy_output = self.config.output_path.join(output_name(input, NOISY_SUFFIX));
			write_image(&noisy_output, noisy.view())?;
			let psnr_noisy = psnr(&noisy, &clean, 1.0)?;
			let psnr_denoised = psnr(&denoised, &clean, 1.0)?;
			info!(
				"{}: PSNR noisy {:.2} dB, denoised {:.2} dB",
				input.display(),
				psnr_noisy,
				psnr_denoised
			);
			report.noisy_output = Some(noisy_output);
			report.psnr_noisy = Some(psnr_noisy);
			report.psnr_denoised = Some(psnr_denoised);
		}
		Ok(report)
	}

	/// Processes every input under the configured test path. The first failure aborts the run.
	pub fn run(&mut self) -> Result<InferenceReport> {
		let inputs = collect_inputs(&self.config.test_path)?;
		fs::create_dir_all(&self.config.output_path)?;

		let mut op = OperationLogger::new("Inference");
		op.add_metadata("images", inputs.len());
		op.add_metadata("sigma", self.config.noise_sigma * PIXEL_SCALE);

		let bar = create_progress_bar(inputs.len() as u64, self.config.show_progress);
		let mut images = Vec::with_capacity(inputs.len());
		for input in &inputs {
			bar.set_message(input.display().to_string());
			match self.process(input) {
				Ok(report) => images.push(report),
				Err(e) => {
					bar.abandon();
					op.log_error(&e);
					return Err(e);
				},
			}
			bar.inc(1);
		}
		bar.finish_and_clear();

		let mut report = InferenceReport {
			images,
			elapsed: Duration::default(),
		};
		if let Some((noisy, denoised)) = report.average_psnr() {
			info!("Average PSNR: noisy {:.2} dB, denoised {:.2} dB", noisy, denoised);
		}
		report.elapsed = op.complete();
		Ok(report)
	}
}
