use crate::config::{ColorMode, NetworkConfig};
use crate::constants::codec::XZ_LEVEL;
use crate::error::{FfdnetError, Result};
use crate::network::DenoisingNetwork;
use bincode::{deserialize, serialize};
use burn::module::Module;
use burn::record::{BinBytesRecorder, FullPrecisionSettings, Recorder};
use burn::tensor::backend::Backend;
use log::{debug, info};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use xz2::read::{XzDecoder, XzEncoder};

type WeightRecorder = BinBytesRecorder<FullPrecisionSettings>;

/// The network hyperparameters and its module record as written by burn's binary recorder.
#[derive(Debug, Serialize, Deserialize)]
pub struct NetworkDescription {
	pub channels: u32,
	pub features: u32,
	pub depth: u32,
	pub weights: Vec<u8>,
}

impl NetworkDescription {
	pub fn of<B: Backend, N: DenoisingNetwork<B>>(network: &N) -> Result<Self> {
		let (channels, features, depth) = shape_of(&network.config());
		let recorder = WeightRecorder::default();
		let weights = <WeightRecorder as Recorder<B>>::record(&recorder, network.clone().into_record(), ())?;
		Ok(NetworkDescription {
			channels,
			features,
			depth,
			weights,
		})
	}
}

fn shape_of(config: &NetworkConfig) -> (u32, u32, u32) {
	(config.channels() as u32, config.features as u32, config.depth as u32)
}

/// Serialises and compresses.
pub fn network_to_bytes(desc: &NetworkDescription) -> Result<Vec<u8>> {
	let serialized: Vec<u8> = serialize(desc)?;
	let compressed = XzEncoder::new(serialized.as_slice(), XZ_LEVEL)
		.bytes()
		.collect::<::std::result::Result<Vec<_>, _>>()?;
	Ok(compressed)
}

pub fn network_from_bytes(data: &[u8]) -> Result<NetworkDescription> {
	let decompressed = XzDecoder::new(data)
		.bytes()
		.collect::<::std::result::Result<Vec<_>, _>>()
		.map_err(|e| FfdnetError::Serialization(format!("Checkpoint decompression failed: {}", e)))?;
	Ok(deserialize(&decompressed)?)
}

/// Writes the network to `path`, creating parent directories and overwriting any existing file.
pub fn save_network<B: Backend, N: DenoisingNetwork<B>>(path: &Path, network: &N) -> Result<()> {
	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent)?;
		}
	}
	let bytes = network_to_bytes(&NetworkDescription::of(network)?)?;
	fs::write(path, &bytes)?;
	debug!("Wrote {} bytes to {}", bytes.len(), path.display());
	Ok(())
}

/// Restores weights saved by [`save_network`] into an already constructed network.
pub fn load_network<B: Backend, N: DenoisingNetwork<B>>(path: &Path, network: N, device: &B::Device) -> Result<N> {
	if !path.is_file() {
		return Err(FfdnetError::FileNotFound(path.to_path_buf()));
	}
	let desc = network_from_bytes(&fs::read(path)?)?;

	let expected = shape_of(&network.config());
	let found = (desc.channels, desc.features, desc.depth);
	if expected != found {
		return Err(FfdnetError::ShapeMismatch(format!(
			"{} holds a network with (channels, features, depth) = {:?}, expected {:?}",
			path.display(),
			found,
			expected
		)));
	}
	let recorder = WeightRecorder::default();
	let record = <WeightRecorder as Recorder<B>>::load(&recorder, desc.weights, device)?;
	Ok(network.load_record(record))
}

/// Resolves and manages the one checkpoint file kept per colour mode.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
	model_dir: PathBuf,
}

impl CheckpointStore {
	pub fn new(model_dir: impl AsRef<Path>) -> Self {
		Self {
			model_dir: model_dir.as_ref().to_path_buf(),
		}
	}

	pub fn model_dir(&self) -> &Path {
		&self.model_dir
	}

	pub fn path_for(&self, color: ColorMode) -> PathBuf {
		self.model_dir.join(color.checkpoint_name())
	}

	pub fn save<B: Backend, N: DenoisingNetwork<B>>(&self, network: &N) -> Result<PathBuf> {
		let path = self.path_for(network.config().color);
		save_network(&path, network)?;
		info!("Saved checkpoint to {}", path.display());
		Ok(path)
	}

	pub fn load<B: Backend, N: DenoisingNetwork<B>>(&self, network: N, device: &B::Device) -> Result<N> {
		let path = self.path_for(network.config().color);
		let network = load_network(&path, network, device)?;
		info!("Loaded checkpoint from {}", path.display());
		Ok(network)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::device::CpuBackend;
	use crate::network::FfdNet;
	use burn::backend::ndarray::NdArrayDevice;

	#[test]
	fn description_round_trip() {
		let config = NetworkConfig::builder(ColorMode::Gray).features(2).depth(3).build();
		let net = FfdNet::<CpuBackend>::new(&config, &NdArrayDevice::Cpu).unwrap();
		let desc = NetworkDescription::of(&net).unwrap();
		assert!(!desc.weights.is_empty());

		let decoded = network_from_bytes(&network_to_bytes(&desc).unwrap()).unwrap();
		assert_eq!((decoded.channels, decoded.features, decoded.depth), (1, 2, 3));
		assert_eq!(decoded.weights, desc.weights);
	}

	#[test]
	fn garbage_is_rejected() {
		assert!(network_from_bytes(b"definitely not xz").is_err());
	}

	#[test]
	fn path_layout() {
		let store = CheckpointStore::new("models");
		assert_eq!(store.path_for(ColorMode::Gray), PathBuf::from("models/net_gray.pth"));
		assert_eq!(store.path_for(ColorMode::Rgb), PathBuf::from("models/net_rgb.pth"));
	}
}
