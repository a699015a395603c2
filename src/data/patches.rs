use crate::error::{FfdnetError, Result};
use ndarray::{Array3, Array4, ArrayView3, Axis};

/// Number of crop offsets of size `patch_size` that fit along a dimension of length `dim`.
pub fn patches_along(dim: usize, patch_size: usize, stride: usize) -> usize {
	if patch_size == 0 || stride == 0 || dim < patch_size {
		0
	} else {
		(dim - patch_size) / stride + 1
	}
}

/// Crops square patches out of a `C x W x H` image.
///
/// Offsets advance by `stride` along the width (outer) and height (inner). Returns an
/// `N x C x P x P` array, with `N == 0` when the image is smaller than the patch.
pub fn image_to_patches(image: ArrayView3<f32>, patch_size: usize, stride: usize) -> Array4<f32> {
	let (channels, width, height) = image.dim();
	let across = patches_along(width, patch_size, stride);
	let down = patches_along(height, patch_size, stride);

	let mut patches = Array4::zeros((across * down, channels, patch_size, patch_size));
	let mut index = 0;
	for i in 0..across {
		let x = i * stride;
		for j in 0..down {
			let y = j * stride;
			patches
				.index_axis_mut(Axis(0), index)
				.assign(&image.slice(s![.., x..x + patch_size, y..y + patch_size]));
			index += 1;
		}
	}
	patches
}

/// Stacks the patches of every image, in image order then spatial order.
pub fn images_to_patches(images: &[Array3<f32>], patch_size: usize, stride: usize) -> Result<Array4<f32>> {
	let channels = match images.first() {
		Some(image) => image.dim().0,
		None => return Err(FfdnetError::EmptyDataset("No images to slice into patches".into())),
	};

	let mut per_image = Vec::with_capacity(images.len());
	for image in images {
		if image.dim().0 != channels {
			return Err(FfdnetError::InvalidInput(format!(
				"Mixed channel counts in dataset: {} and {}",
				channels,
				image.dim().0
			)));
		}
		let patches = image_to_patches(image.view(), patch_size, stride);
		if patches.len_of(Axis(0)) > 0 {
			per_image.push(patches);
		}
	}

	if per_image.is_empty() {
		return Err(FfdnetError::EmptyDataset(format!(
			"No image is at least {0}x{0} pixels",
			patch_size
		)));
	}

	let views: Vec<_> = per_image.iter().map(|p| p.view()).collect();
	Ok(ndarray::concatenate(Axis(0), &views)?)
}
