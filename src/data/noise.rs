use crate::constants::noise::PIXEL_SCALE;
use crate::error::{FfdnetError, Result};
use ndarray::{Array, Array1, Dimension};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::fmt;

/// Half-open range of integer noise levels on the 0-255 scale, `start..end` by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseInterval {
	pub start: u32,
	pub end: u32,
	pub step: u32,
}

impl NoiseInterval {
	pub fn new(start: u32, end: u32, step: u32) -> Self {
		NoiseInterval { start, end, step }
	}

	/// Builds the interval from command line `[low, high, step]` values.
	///
	/// The upper bound is made inclusive, so `0 75 15` enumerates 0 through 75.
	pub fn from_cli(values: [u32; 3]) -> Self {
		NoiseInterval::new(values[0], values[1].saturating_add(1), values[2])
	}

	/// Inverse of `from_cli`.
	pub fn to_cli(&self) -> [u32; 3] {
		[self.start, self.end.saturating_sub(1), self.step]
	}

	pub fn validate(&self) -> Result<()> {
		if self.step == 0 {
			return Err(FfdnetError::Config("Noise interval step must be greater than 0".into()));
		}
		if self.start >= self.end {
			return Err(FfdnetError::Config(format!(
				"Noise interval {} is empty",
				self
			)));
		}
		match self.last_level() {
			Some(last) if last as f32 > PIXEL_SCALE => Err(FfdnetError::Config(format!(
				"Noise interval {} exceeds the maximum level {}",
				self, PIXEL_SCALE
			))),
			_ => Ok(()),
		}
	}

	/// Largest level `levels()` would yield, without enumerating them.
	pub fn last_level(&self) -> Option<u32> {
		if self.step == 0 || self.start >= self.end {
			return None;
		}
		Some(self.start + (self.end - 1 - self.start) / self.step * self.step)
	}

	pub fn levels(&self) -> Vec<u32> {
		if self.step == 0 {
			return Vec::new();
		}
		(self.start..self.end).step_by(self.step as usize).collect()
	}

	/// Levels divided by 255.
	pub fn normalised(&self) -> Vec<f32> {
		self.levels()
			.into_iter()
			.map(|level| level as f32 / PIXEL_SCALE)
			.collect()
	}
}

impl fmt::Display for NoiseInterval {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "[{}, {}, {})", self.start, self.end, self.step)
	}
}

pub fn validate_sigma(sigma: f32) -> Result<()> {
	if (0.0..=1.0).contains(&sigma) {
		Ok(())
	} else {
		Err(FfdnetError::InvalidParameter(format!(
			"Noise sigma ({}) must lie in [0, 1]",
			sigma
		)))
	}
}

/// Returns `clean` plus independent zero-mean Gaussian noise of standard deviation `sigma`.
pub fn add_noise<D, R>(clean: &Array<f32, D>, sigma: f32, rng: &mut R) -> Result<Array<f32, D>>
where
	D: Dimension,
	R: Rng + ?Sized,
{
	validate_sigma(sigma)?;
	if sigma == 0.0 {
		return Ok(clean.clone());
	}
	let normal = Normal::new(0.0f32, sigma)
		.map_err(|e| FfdnetError::InvalidParameter(format!("Invalid noise distribution: {}", e)))?;
	Ok(clean.mapv(|v| v + normal.sample(rng)))
}

/// The per-item conditioning array handed to the network alongside a batch.
pub fn noise_levels_for_batch(batch_size: usize, sigma: f32) -> Array1<f32> {
	Array1::from_elem(batch_size, sigma)
}
