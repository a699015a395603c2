use crate::config::ColorMode;
use crate::constants::{file, noise::PIXEL_SCALE};
use crate::error::{FfdnetError, Result};
use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use log::info;
use ndarray::{Array3, ArrayView3};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
	Train,
	Val,
}

impl Split {
	fn dir_name(self) -> &'static str {
		match self {
			Split::Train => file::TRAIN_DIR,
			Split::Val => file::VAL_DIR,
		}
	}
}

/// Resolves `base/{gray,rgb}/{train,val}`. Quote characters left over from shell quoting are dropped.
pub fn dataset_dir(base: &Path, color: ColorMode, split: Split) -> PathBuf {
	let cleaned: String = base
		.to_string_lossy()
		.chars()
		.filter(|c| *c != '\'' && *c != '"')
		.collect();
	PathBuf::from(cleaned).join(color.dir_name()).join(split.dir_name())
}

/// Every regular file directly inside `dir`, sorted by name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
	if !dir.is_dir() {
		return Err(FfdnetError::FileNotFound(dir.to_path_buf()));
	}
	let mut files = Vec::new();
	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() {
			files.push(path);
		}
	}
	files.sort();
	Ok(files)
}

/// Decodes an image into a normalised `C x W x H` array.
pub fn read_image(path: &Path, color: ColorMode) -> Result<Array3<f32>> {
	if !path.is_file() {
		return Err(FfdnetError::FileNotFound(path.to_path_buf()));
	}
	let decoded = image::open(path)?;

	let array = match color {
		ColorMode::Gray => {
			let luma = decoded.to_luma8();
			let (width, height) = luma.dimensions();
			Array3::from_shape_fn((1, width as usize, height as usize), |(_, x, y)| {
				luma.get_pixel(x as u32, y as u32)[0] as f32 / PIXEL_SCALE
			})
		},
		ColorMode::Rgb => {
			let rgb = decoded.to_rgb8();
			let (width, height) = rgb.dimensions();
			Array3::from_shape_fn((3, width as usize, height as usize), |(c, x, y)| {
				rgb.get_pixel(x as u32, y as u32)[c] as f32 / PIXEL_SCALE
			})
		},
	};
	Ok(array)
}

/// Loads every file in `dir`. A single undecodable file fails the whole load.
pub fn load_images(dir: &Path, color: ColorMode) -> Result<Vec<Array3<f32>>> {
	info!("Loading images in {}", dir.display());
	let files = list_files(dir)?;
	files.par_iter().map(|path| read_image(path, color)).collect()
}

fn to_byte(value: f32) -> u8 {
	(value.max(0.0).min(1.0) * PIXEL_SCALE).round() as u8
}

/// Writes a `C x W x H` array as PNG, clamping values to [0, 1].
pub fn write_image(path: &Path, image: ArrayView3<f32>) -> Result<()> {
	let (channels, width, height) = image.dim();
	match channels {
		1 => {
			let buffer = GrayImage::from_fn(width as u32, height as u32, |x, y| {
				Luma([to_byte(image[[0, x as usize, y as usize]])])
			});
			buffer.save_with_format(path, ImageFormat::Png)?;
		},
		3 => {
			let buffer = RgbImage::from_fn(width as u32, height as u32, |x, y| {
				let (x, y) = (x as usize, y as usize);
				Rgb([
					to_byte(image[[0, x, y]]),
					to_byte(image[[1, x, y]]),
					to_byte(image[[2, x, y]]),
				])
			});
			buffer.save_with_format(path, ImageFormat::Png)?;
		},
		_ => {
			return Err(FfdnetError::InvalidInput(format!(
				"Cannot write an image with {} channels",
				channels
			)))
		},
	}
	Ok(())
}
