use crate::error::{FfdnetError, Result};
use ndarray::{Array, Dimension, Zip};

/// Peak signal-to-noise ratio in dB between two images of identical shape.
///
/// Values are clamped to [0, 1] before comparison and `data_range` is the peak value.
/// Identical images give `f32::INFINITY`.
pub fn psnr<D: Dimension>(image1: &Array<f32, D>, image2: &Array<f32, D>, data_range: f32) -> Result<f32> {
	if image1.shape() != image2.shape() {
		return Err(FfdnetError::ShapeMismatch(format!(
			"Cannot compare images of shape {:?} and {:?}",
			image1.shape(),
			image2.shape()
		)));
	}
	if image1.is_empty() {
		return Err(FfdnetError::InvalidInput("Cannot compute PSNR of an empty image".into()));
	}

	let error = Zip::from(image1).and(image2).fold(0.0f64, |acc, &a, &b| {
		let diff = (clamp_pixel(a) - clamp_pixel(b)) as f64;
		acc + diff * diff
	});
	let mse = error / image1.len() as f64;
	if mse == 0.0 {
		return Ok(f32::INFINITY);
	}
	Ok((10.0 * ((data_range as f64).powi(2) / mse).log10()) as f32)
}

fn clamp_pixel(value: f32) -> f32 {
	value.max(0.0).min(1.0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use ndarray::Array3;

	#[test]
	fn identical_images_are_infinite() {
		let image = Array3::from_elem((1, 4, 4), 0.3);
		assert_eq!(psnr(&image, &image, 1.0).unwrap(), f32::INFINITY);
	}

	#[test]
	fn known_error() {
		let a = Array3::from_elem((3, 2, 2), 0.5);
		let b = Array3::from_elem((3, 2, 2), 0.6);
		// mse = 0.01
		assert!((psnr(&a, &b, 1.0).unwrap() - 20.0).abs() < 1e-3);
	}

	#[test]
	fn values_are_clamped() {
		let a = Array3::from_elem((1, 2, 2), 1.5);
		let b = Array3::from_elem((1, 2, 2), 1.0);
		assert_eq!(psnr(&a, &b, 1.0).unwrap(), f32::INFINITY);
	}

	#[test]
	fn shape_mismatch() {
		let a = Array3::<f32>::zeros((1, 2, 2));
		let b = Array3::<f32>::zeros((1, 2, 3));
		assert!(psnr(&a, &b, 1.0).is_err());
	}
}
