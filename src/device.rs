use crate::error::{FfdnetError, Result};
use burn::backend::{Autodiff, NdArray};
use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use log::{info, warn};
use ndarray::{Array1, Array4};
use std::fmt;

/// Tensor backend for CPU inference and validation.
pub type CpuBackend = NdArray<f32>;

/// CPU backend with gradient tracking, used for training.
pub type CpuAutodiffBackend = Autodiff<CpuBackend>;

#[cfg(feature = "gpu")]
pub type GpuBackend = burn::backend::Wgpu;

#[cfg(feature = "gpu")]
pub type GpuAutodiffBackend = Autodiff<GpuBackend>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
	Cpu,
	Wgpu,
}

impl fmt::Display for BackendKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			BackendKind::Cpu => write!(f, "NdArray (CPU)"),
			BackendKind::Wgpu => write!(f, "WGPU (GPU)"),
		}
	}
}

impl BackendKind {
	pub fn is_available(&self) -> bool {
		match self {
			BackendKind::Cpu => true,
			BackendKind::Wgpu => cfg!(feature = "gpu"),
		}
	}
}

/// Where every batch and noise-level tensor lives, chosen once at startup.
#[derive(Debug, Clone)]
pub enum Device {
	Cpu { threads: Option<usize> },
	#[cfg(feature = "gpu")]
	Gpu(burn::backend::wgpu::WgpuDevice),
}

impl Device {
	pub fn cpu() -> Self {
		Device::Cpu { threads: None }
	}

	/// Sizes the global rayon pool the NdArray kernels run on.
	pub fn cpu_with_threads(threads: usize) -> Result<Self> {
		if threads == 0 {
			return Err(FfdnetError::InvalidParameter("Thread count must be greater than 0".into()));
		}
		if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
			warn!("Could not resize the worker pool to {} threads: {}", threads, e);
		}
		Ok(Device::Cpu {
			threads: Some(threads),
		})
	}

	pub fn backend(&self) -> BackendKind {
		match self {
			Device::Cpu { .. } => BackendKind::Cpu,
			#[cfg(feature = "gpu")]
			Device::Gpu(_) => BackendKind::Wgpu,
		}
	}

	pub fn threads(&self) -> Option<usize> {
		match self {
			Device::Cpu { threads } => *threads,
			#[cfg(feature = "gpu")]
			Device::Gpu(_) => None,
		}
	}

	pub fn name(&self) -> String {
		match self {
			Device::Cpu { threads: Some(n) } => format!("{} with {} threads", self.backend(), n),
			Device::Cpu { threads: None } => self.backend().to_string(),
			#[cfg(feature = "gpu")]
			Device::Gpu(device) => format!("{} {:?}", self.backend(), device),
		}
	}
}

impl Default for Device {
	fn default() -> Self {
		Self::cpu()
	}
}

/// Picks the device once. A GPU request falls back to the CPU with a warning
/// when the crate was built without the `gpu` feature.
pub fn select_device(use_gpu: bool, threads: Option<usize>) -> Result<Device> {
	let device = if use_gpu && BackendKind::Wgpu.is_available() {
		gpu_device()
	} else {
		if use_gpu {
			warn!("GPU requested but no {} backend is compiled in, falling back to CPU", BackendKind::Wgpu);
		}
		match threads {
			Some(threads) => Device::cpu_with_threads(threads)?,
			None => Device::cpu(),
		}
	};
	info!("Using device: {}", device.name());
	Ok(device)
}

#[cfg(feature = "gpu")]
fn gpu_device() -> Device {
	Device::Gpu(burn::backend::wgpu::WgpuDevice::default())
}

#[cfg(not(feature = "gpu"))]
fn gpu_device() -> Device {
	Device::cpu()
}

/// Copies an `N x C x W x H` host batch onto `device`.
pub fn to_device_batch<B: Backend>(batch: &Array4<f32>, device: &B::Device) -> Tensor<B, 4> {
	let data = TensorData::new(batch.iter().copied().collect::<Vec<f32>>(), batch.shape().to_vec());
	Tensor::from_data(data, device)
}

/// Copies the per-item noise levels onto `device`.
pub fn to_device_levels<B: Backend>(levels: &Array1<f32>, device: &B::Device) -> Tensor<B, 1> {
	let data = TensorData::new(levels.to_vec(), [levels.len()]);
	Tensor::from_data(data, device)
}

pub fn to_host<B: Backend>(tensor: Tensor<B, 4>) -> Result<Array4<f32>> {
	let [n, c, w, h] = tensor.dims();
	let values = tensor
		.into_data()
		.to_vec::<f32>()
		.map_err(|e| FfdnetError::ShapeMismatch(format!("Could not read tensor back to host: {:?}", e)))?;
	Ok(Array4::from_shape_vec((n, c, w, h), values)?)
}
