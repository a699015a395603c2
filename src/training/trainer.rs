use super::checkpoint::CheckpointStore;
use super::loss::{loss_value, squared_error};
use super::progress::{estimate_remaining, format_duration, percent};
use super::validation::validate;
use crate::config::TrainingConfig;
use crate::constants::noise::PIXEL_SCALE;
use crate::data::{add_noise, noise_levels_for_batch, BatchLoader};
use crate::device::{to_device_batch, to_device_levels};
use crate::error::{FfdnetError, Result};
use crate::logging::{create_progress_bar, OperationLogger};
use crate::network::DenoisingNetwork;
use burn::module::AutodiffModule;
use burn::optim::{GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use log::{debug, info};
use ndarray::{Array4, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
	pub epochs: usize,
	/// Optimiser updates applied over the whole run.
	pub steps: usize,
	/// Average training loss of each epoch.
	pub train_losses: Vec<f32>,
	/// `(epoch, average loss)` for every epoch that ran validation.
	pub val_losses: Vec<(usize, f32)>,
	pub checkpoint: PathBuf,
	pub elapsed: Duration,
}

pub struct Trainer<B: AutodiffBackend> {
	config: TrainingConfig,
	device: B::Device,
	store: CheckpointStore,
	rng: StdRng,
	steps: usize,
}

impl<B: AutodiffBackend> Trainer<B> {
	pub fn new(config: TrainingConfig, device: &B::Device, store: CheckpointStore) -> Result<Self> {
		config.validate()?;
		let rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};
		Ok(Trainer {
			config,
			device: device.clone(),
			store,
			rng,
			steps: 0,
		})
	}

	pub fn config(&self) -> &TrainingConfig {
		&self.config
	}

	pub fn steps(&self) -> usize {
		self.steps
	}

	/// Noises `clean` at `sigma`, runs forward and backward, and updates the parameters.
	/// Returns the summed squared error of the step.
	pub fn train_step<M, O>(&mut self, network: &mut M, optimizer: &mut O, clean: &Array4<f32>, sigma: f32) -> Result<f32>
	where
		M: DenoisingNetwork<B> + AutodiffModule<B>,
		O: Optimizer<M, B>,
	{
		let n = clean.len_of(Axis(0));
		let noisy = to_device_batch::<B>(&add_noise(clean, sigma, &mut self.rng)?, &self.device);
		let target = to_device_batch::<B>(clean, &self.device);
		let levels = to_device_levels::<B>(&noise_levels_for_batch(n, sigma), &self.device);

		let output = network.forward(noisy, levels)?;
		let loss = squared_error(output, target)?;
		let value = loss_value(&loss);
		if !value.is_finite() {
			return Err(FfdnetError::Training(format!("Loss diverged at sigma {}", sigma)));
		}

		let grads = GradientsParams::from_grads(loss.backward(), &*network);
		*network = optimizer.step(self.config.learning_rate as f64, network.clone(), grads);
		self.steps += 1;
		Ok(value)
	}

	/// One pass over `loader`, every batch trained once per noise level. Returns the average loss.
	pub fn train_epoch<M, O>(
		&mut self,
		network: &mut M,
		optimizer: &mut O,
		loader: &BatchLoader,
		epoch: usize,
	) -> Result<f32>
	where
		M: DenoisingNetwork<B> + AutodiffModule<B>,
		O: Optimizer<M, B>,
	{
		let levels = self.config.train_noise.normalised();
		let batches = loader.len();
		let steps = batches * levels.len();
		if steps == 0 {
			return Err(FfdnetError::EmptyDataset("Training set produced no batches".into()));
		}

		let bar = create_progress_bar(steps as u64, self.config.show_progress);
		let start = Instant::now();
		let mut done = 0;
		let mut running = 0.0f64;

		for (batch_index, clean) in loader.epoch(&mut self.rng).enumerate() {
			for &sigma in &levels {
				let loss = self.train_step(network, optimizer, &clean, sigma)?;
				done += 1;
				running += loss as f64;

				let eta = estimate_remaining(done, steps, start.elapsed());
				bar.set_message(format!(
					"epoch {}/{} batch {}/{} sigma {:.0} loss {:.4} eta {}",
					epoch + 1,
					self.config.epochs,
					batch_index + 1,
					batches,
					sigma * PIXEL_SCALE,
					loss,
					format_duration(eta)
				));
				bar.inc(1);
				debug!("epoch {} step {} loss {}", epoch + 1, done, loss);
			}
		}
		bar.finish_and_clear();

		Ok((running / done.max(1) as f64) as f32)
	}

	/// Full schedule: train every epoch, checkpoint and validate on their intervals,
	/// then write the final checkpoint from the eval-mode module.
	pub fn run<M, O>(
		&mut self,
		network: &mut M,
		optimizer: &mut O,
		train: &BatchLoader,
		val: &BatchLoader,
	) -> Result<TrainingSummary>
	where
		M: DenoisingNetwork<B> + AutodiffModule<B>,
		M::InnerModule: DenoisingNetwork<B::InnerBackend>,
		O: Optimizer<M, B>,
	{
		let mut op = OperationLogger::new(format!("Training {} network", network.config().color));
		op.add_metadata("epochs", self.config.epochs);
		op.add_metadata("parameters", network.parameters());
		op.add_metadata("train_batches", train.len());
		op.add_metadata("val_batches", val.len());

		let val_levels = self.config.val_noise.normalised();
		let mut train_losses = Vec::with_capacity(self.config.epochs);
		let mut val_losses = Vec::new();

		for epoch in 0..self.config.epochs {
			let epoch_start = Instant::now();
			let loss = match self.train_epoch(network, optimizer, train, epoch) {
				Ok(loss) => loss,
				Err(e) => {
					op.log_error(&e);
					return Err(e);
				},
			};
			train_losses.push(loss);
			op.log_progress(format!(
				"epoch {}/{} ({:.0}%): average loss {:.6} in {:.1}s",
				epoch + 1,
				self.config.epochs,
				percent(epoch + 1, self.config.epochs),
				loss,
				epoch_start.elapsed().as_secs_f64()
			));

			let validate_now = (epoch + 1) % self.config.val_epoch == 0;
			if validate_now || (epoch + 1) % self.config.save_checkpoints == 0 {
				self.store.save::<B, M>(&*network)?;
			}
			if validate_now {
				let evaluated = network.valid();
				let val_loss =
					validate::<B::InnerBackend, _, _>(&evaluated, val, &val_levels, &self.device, &mut self.rng)?;
				info!("Epoch {}: validation loss {:.6}", epoch + 1, val_loss);
				val_losses.push((epoch, val_loss));
			}
		}

		let evaluated = network.valid();
		let checkpoint = self.store.save::<B::InnerBackend, _>(&evaluated)?;
		let elapsed = op.complete();

		Ok(TrainingSummary {
			epochs: self.config.epochs,
			steps: self.steps,
			train_losses,
			val_losses,
			checkpoint,
			elapsed,
		})
	}
}
