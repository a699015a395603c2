use crate::error::{FfdnetError, Result};
use burn::nn::loss::{MseLoss, Reduction};
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};

/// Summed (not averaged) squared error between `output` and `target`.
pub fn squared_error<B: Backend>(output: Tensor<B, 4>, target: Tensor<B, 4>) -> Result<Tensor<B, 1>> {
	if output.dims() != target.dims() {
		return Err(FfdnetError::ShapeMismatch(format!(
			"Output {:?} and target {:?} differ in shape",
			output.dims(),
			target.dims()
		)));
	}
	Ok(MseLoss::new().forward(output, target, Reduction::Sum))
}

pub fn loss_value<B: Backend>(loss: &Tensor<B, 1>) -> f32 {
	loss.clone().into_scalar().elem::<f32>()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::device::CpuBackend;
	use burn::backend::ndarray::NdArrayDevice;

	#[test]
	fn loss_is_summed_not_averaged() {
		let device = NdArrayDevice::Cpu;
		let output = Tensor::<CpuBackend, 4>::ones([2, 1, 2, 2], &device);
		let target = Tensor::<CpuBackend, 4>::zeros([2, 1, 2, 2], &device);
		let loss = squared_error(output, target).unwrap();
		assert_eq!(loss_value(&loss), 8.0);
	}

	#[test]
	fn shape_mismatch() {
		let device = NdArrayDevice::Cpu;
		let a = Tensor::<CpuBackend, 4>::zeros([1, 1, 2, 2], &device);
		let b = Tensor::<CpuBackend, 4>::zeros([1, 1, 2, 4], &device);
		assert!(squared_error(a, b).is_err());
	}
}
