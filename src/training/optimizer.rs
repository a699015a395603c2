use crate::constants::training::{ADAM_BETA1, ADAM_BETA2, ADAM_EPSILON};
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, Optimizer};
use burn::tensor::backend::AutodiffBackend;

/// Adam with betas (0.9, 0.999) and epsilon 1e-8. The learning rate is passed on every step.
pub fn adam<B, M>() -> impl Optimizer<M, B>
where
	B: AutodiffBackend,
	M: AutodiffModule<B>,
{
	AdamConfig::new()
		.with_beta_1(ADAM_BETA1)
		.with_beta_2(ADAM_BETA2)
		.with_epsilon(ADAM_EPSILON)
		.init()
}
