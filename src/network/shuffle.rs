use crate::constants::network::DOWNSCALE_FACTOR;
use crate::error::{FfdnetError, Result};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

const F: usize = DOWNSCALE_FACTOR;

/// Rearranges `N x C x W x H` into `N x 4C x W/2 x H/2`.
///
/// Output channel `4c + 2i + j` holds the pixels at `(2x + i, 2y + j)` of input channel `c`.
pub fn pixel_unshuffle<B: Backend>(input: Tensor<B, 4>) -> Result<Tensor<B, 4>> {
	let [n, c, w, h] = input.dims();
	if w % F != 0 || h % F != 0 {
		return Err(FfdnetError::InvalidInput(format!(
			"Image dimensions must be even, got {}x{}",
			w, h
		)));
	}
	let (w2, h2) = (w / F, h / F);
	Ok(input
		.reshape([n, c, w2, F, h2, F])
		.permute([0, 1, 3, 5, 2, 4])
		.reshape([n, c * F * F, w2, h2]))
}

/// Inverse of [`pixel_unshuffle`]: `N x 4C x W x H` into `N x C x 2W x 2H`.
pub fn pixel_shuffle<B: Backend>(input: Tensor<B, 4>) -> Result<Tensor<B, 4>> {
	let [n, c, w, h] = input.dims();
	if c % (F * F) != 0 {
		return Err(FfdnetError::ShapeMismatch(format!(
			"Pixel shuffle needs a multiple of {} channels, got {}",
			F * F,
			c
		)));
	}
	Ok(input
		.reshape([n, c / (F * F), F, F, w, h])
		.permute([0, 1, 4, 2, 5, 3])
		.reshape([n, c / (F * F), w * F, h * F]))
}

/// Broadcasts one level per sample into the `N x C x W x H` conditioning map.
pub fn noise_map<B: Backend>(levels: Tensor<B, 1>, channels: usize, width: usize, height: usize) -> Tensor<B, 4> {
	let [n] = levels.dims();
	levels.reshape([n, 1, 1, 1]).expand([n, channels, width, height])
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::device::{to_device_batch, to_device_levels, to_host, CpuBackend};
	use burn::backend::ndarray::NdArrayDevice;
	use ndarray::{Array1, Array4, Axis};

	fn tensor(array: &Array4<f32>) -> Tensor<CpuBackend, 4> {
		to_device_batch(array, &NdArrayDevice::Cpu)
	}

	#[test]
	fn unshuffle_layout() {
		let input = Array4::from_shape_fn((1, 1, 4, 4), |(_, _, x, y)| (x * 4 + y) as f32);
		let down = to_host(pixel_unshuffle(tensor(&input)).unwrap()).unwrap();
		assert_eq!(down.dim(), (1, 4, 2, 2));
		assert_eq!(down[[0, 0, 1, 1]], input[[0, 0, 2, 2]]);
		assert_eq!(down[[0, 1, 0, 1]], input[[0, 0, 0, 3]]);
		assert_eq!(down[[0, 2, 1, 0]], input[[0, 0, 3, 0]]);
		assert_eq!(down[[0, 3, 0, 0]], input[[0, 0, 1, 1]]);
	}

	#[test]
	fn shuffle_inverts_unshuffle() {
		let input = Array4::from_shape_fn((2, 3, 6, 4), |(n, c, x, y)| (n * 100 + c * 30 + x * 4 + y) as f32);
		let down = pixel_unshuffle(tensor(&input)).unwrap();
		assert_eq!(down.dims(), [2, 12, 3, 2]);
		let round_trip = to_host(pixel_shuffle(down).unwrap()).unwrap();
		assert_eq!(round_trip, input);
	}

	#[test]
	fn odd_dimensions_are_rejected() {
		assert!(pixel_unshuffle(tensor(&Array4::zeros((1, 1, 5, 4)))).is_err());
		assert!(pixel_shuffle(tensor(&Array4::zeros((1, 3, 2, 2)))).is_err());
	}

	#[test]
	fn noise_map_is_constant_per_sample() {
		let levels = to_device_levels::<CpuBackend>(&Array1::from(vec![0.1, 0.2]), &NdArrayDevice::Cpu);
		let map = to_host(noise_map(levels, 3, 2, 2)).unwrap();
		assert_eq!(map.dim(), (2, 3, 2, 2));
		assert!(map.index_axis(Axis(0), 0).iter().all(|&v| v == 0.1));
		assert!(map.index_axis(Axis(0), 1).iter().all(|&v| v == 0.2));
	}
}
