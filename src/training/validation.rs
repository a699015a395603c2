use super::loss::{loss_value, squared_error};
use crate::data::{add_noise, noise_levels_for_batch, BatchLoader};
use crate::device::{to_device_batch, to_device_levels};
use crate::error::{FfdnetError, Result};
use crate::network::DenoisingNetwork;
use burn::tensor::backend::Backend;
use log::debug;
use ndarray::Axis;
use rand::Rng;

/// Average summed squared error over every `batch x noise level` pair.
///
/// Callers pass the eval-mode module (`AutodiffModule::valid`), so nothing here
/// updates BatchNorm statistics or records gradients.
pub fn validate<B, N, R>(
	network: &N,
	loader: &BatchLoader,
	levels: &[f32],
	device: &B::Device,
	rng: &mut R,
) -> Result<f32>
where
	B: Backend,
	N: DenoisingNetwork<B>,
	R: Rng + ?Sized,
{
	if levels.is_empty() {
		return Err(FfdnetError::Config("No validation noise levels".into()));
	}

	let mut total = 0.0f64;
	let mut steps = 0usize;
	for clean in loader.epoch(rng) {
		let n = clean.len_of(Axis(0));
		for &sigma in levels {
			let noisy = to_device_batch::<B>(&add_noise(&clean, sigma, rng)?, device);
			let target = to_device_batch::<B>(&clean, device);
			let sigmas = to_device_levels::<B>(&noise_levels_for_batch(n, sigma), device);
			let output = network.forward(noisy, sigmas)?;
			total += loss_value(&squared_error(output, target)?) as f64;
			steps += 1;
		}
	}

	if steps == 0 {
		return Err(FfdnetError::EmptyDataset("Validation set produced no batches".into()));
	}
	let average = (total / steps as f64) as f32;
	debug!("Validation: {} steps, average loss {:.6}", steps, average);
	Ok(average)
}
