use crate::config::RunConfig;
use crate::data::{dataset_dir, images_to_patches, load_images, BatchLoader, PatchDataset, Split};
use crate::error::Result;
use crate::logging::create_spinner;
use crate::network::FfdNet;
use crate::training::{adam, CheckpointStore, Trainer, TrainingSummary};
use crate::validation;
use burn::tensor::backend::AutodiffBackend;
use log::info;

/// Loads both splits, builds a fresh network and runs the full training schedule.
pub fn train<B: AutodiffBackend>(config: &RunConfig, device: &B::Device) -> Result<TrainingSummary> {
	let training = &config.training;
	let color = config.color();
	config.network.validate()?;
	training.validate()?;

	let train_dir = dataset_dir(&training.train_path, color, Split::Train);
	let val_dir = dataset_dir(&training.train_path, color, Split::Val);
	validation::validate_directory(&train_dir)?;
	validation::validate_directory(&val_dir)?;
	let store = CheckpointStore::new(&config.model_path);
	validation::validate_output_dir(store.model_dir())?;

	let train_loader = load_split(config, &train_dir, true)?;
	let val_loader = load_split(config, &val_dir, false)?;
	info!(
		"Training on {} patches, validating on {} patches",
		train_loader.dataset().len(),
		val_loader.dataset().len()
	);

	let mut network = FfdNet::<B>::seeded(&config.network, training.seed, device)?;
	let mut optimizer = adam();

	let mut trainer = Trainer::<B>::new(training.clone(), device, store)?;
	let summary = trainer.run(&mut network, &mut optimizer, &train_loader, &val_loader)?;

	if let Some(last) = summary.train_losses.last() {
		info!("Final training loss {:.6}", last);
	}
	info!("Model saved to {}", summary.checkpoint.display());
	Ok(summary)
}

fn load_split(config: &RunConfig, dir: &std::path::Path, shuffle: bool) -> Result<BatchLoader> {
	let training = &config.training;
	let spinner = create_spinner(format!("Loading {}", dir.display()), training.show_progress);
	let images = load_images(dir, config.color())?;
	let patches = images_to_patches(&images, training.patch_size, training.patch_stride)?;
	spinner.finish_and_clear();

	info!(
		"{}: {} images, {} patches of {}x{}",
		dir.display(),
		images.len(),
		patches.len_of(ndarray::Axis(0)),
		training.patch_size,
		training.patch_size
	);
	BatchLoader::new(
		PatchDataset::new(patches),
		training.batch_size,
		shuffle,
		if shuffle { training.prefetch } else { 0 },
	)
}
