use crate::config::{ColorMode, InferenceConfig, NetworkConfig, RunConfig, TrainingConfig};
use crate::constants::{file, inference, noise, training};
use crate::data::NoiseInterval;
use crate::error::{FfdnetError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Run configuration as stored on disk; any missing section or key takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub network: NetworkSection,

    #[serde(default)]
    pub training: TrainingSection,

    #[serde(default)]
    pub inference: InferenceSection,

    #[serde(default)]
    pub runtime: RuntimeSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSection {
    /// Single-channel images when true, RGB otherwise (default: false)
    pub is_gray: bool,

    /// Feature maps per hidden layer (default: 64 gray, 96 rgb)
    pub features: Option<usize>,

    /// Number of convolution layers (default: 15 gray, 12 rgb)
    pub depth: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSection {
    pub train_path: String,
    pub patch_size: usize,
    /// Defaults to the patch size
    pub patch_stride: Option<usize>,
    /// `[low, high, step]`, high inclusive
    pub train_noise_interval: [u32; 3],
    pub val_noise_interval: [u32; 3],
    pub batch_size: usize,
    pub epochs: usize,
    pub val_epoch: usize,
    pub learning_rate: f32,
    pub save_checkpoints: usize,
    pub prefetch: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSection {
    pub test_path: String,
    pub output_path: String,
    /// On the 0-255 scale
    pub noise_sigma: f32,
    pub add_noise: bool,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSection {
    pub model_path: String,
    pub use_gpu: bool,
    pub threads: Option<usize>,
    pub show_progress: bool,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            is_gray: false,
            features: None,
            depth: None,
        }
    }
}

impl Default for TrainingSection {
    fn default() -> Self {
        Self {
            train_path: training::DEFAULT_TRAIN_PATH.to_string(),
            patch_size: training::DEFAULT_PATCH_SIZE,
            patch_stride: None,
            train_noise_interval: training::DEFAULT_TRAIN_NOISE_INTERVAL,
            val_noise_interval: training::DEFAULT_VAL_NOISE_INTERVAL,
            batch_size: training::DEFAULT_BATCH_SIZE,
            epochs: training::DEFAULT_EPOCHS,
            val_epoch: training::DEFAULT_VAL_EPOCH,
            learning_rate: training::DEFAULT_LEARNING_RATE,
            save_checkpoints: training::DEFAULT_SAVE_CHECKPOINTS,
            prefetch: training::DEFAULT_PREFETCH,
            seed: None,
        }
    }
}

impl Default for InferenceSection {
    fn default() -> Self {
        Self {
            test_path: inference::DEFAULT_TEST_PATH.to_string(),
            output_path: inference::DEFAULT_OUTPUT_PATH.to_string(),
            noise_sigma: inference::DEFAULT_NOISE_SIGMA,
            add_noise: false,
            seed: None,
        }
    }
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            model_path: file::MODEL_DIR.to_string(),
            use_gpu: false,
            threads: None,
            show_progress: true,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            network: NetworkSection::default(),
            training: TrainingSection::default(),
            inference: InferenceSection::default(),
            runtime: RuntimeSection::default(),
        }
    }
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;

        toml::from_str(&contents)
            .map_err(|e| FfdnetError::Parse(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;

        serde_json::from_str(&contents)
            .map_err(|e| FfdnetError::Parse(format!("Failed to parse JSON config: {}", e)))
    }

    /// Picks the format from the extension; anything but `.json` is read as TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(FfdnetError::FileNotFound(path.to_path_buf()));
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Save configuration to a TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| FfdnetError::Serialization(format!("Failed to serialize to TOML: {}", e)))?;

        fs::write(path, contents)?;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| FfdnetError::Serialization(format!("Failed to serialize to JSON: {}", e)))?;

        fs::write(path, contents)?;
        Ok(())
    }

    /// Builds the run configuration. `is_train` and `is_test` are left unset; they
    /// only come from the command line.
    pub fn to_run_config(&self) -> RunConfig {
        let color = ColorMode::from_is_gray(self.network.is_gray);
        let mut network = NetworkConfig::builder(color);
        if let Some(features) = self.network.features {
            network = network.features(features);
        }
        if let Some(depth) = self.network.depth {
            network = network.depth(depth);
        }

        let t = &self.training;
        let mut training = TrainingConfig::builder()
            .train_path(&t.train_path)
            .patch_size(t.patch_size)
            .patch_stride(t.patch_stride.unwrap_or(t.patch_size))
            .train_noise(NoiseInterval::from_cli(t.train_noise_interval))
            .val_noise(NoiseInterval::from_cli(t.val_noise_interval))
            .batch_size(t.batch_size)
            .epochs(t.epochs)
            .val_epoch(t.val_epoch)
            .learning_rate(t.learning_rate)
            .save_checkpoints(t.save_checkpoints)
            .prefetch(t.prefetch)
            .show_progress(self.runtime.show_progress);
        if let Some(seed) = t.seed {
            training = training.seed(seed);
        }

        let i = &self.inference;
        let inference = InferenceConfig {
            test_path: PathBuf::from(&i.test_path),
            output_path: PathBuf::from(&i.output_path),
            noise_sigma: 0.0,
            add_noise: i.add_noise,
            seed: i.seed,
            show_progress: self.runtime.show_progress,
        }
        .with_pixel_sigma(i.noise_sigma);

        RunConfig {
            is_train: false,
            is_test: false,
            use_gpu: self.runtime.use_gpu,
            threads: self.runtime.threads,
            model_path: PathBuf::from(&self.runtime.model_path),
            network: network.build(),
            training: training.build(),
            inference,
        }
    }

    /// Captures an effective run configuration so it can be written back out.
    pub fn from_run_config(config: &RunConfig) -> Self {
        let t = &config.training;
        let i = &config.inference;
        Self {
            network: NetworkSection {
                is_gray: config.color().is_gray(),
                features: Some(config.network.features),
                depth: Some(config.network.depth),
            },
            training: TrainingSection {
                train_path: t.train_path.to_string_lossy().into_owned(),
                patch_size: t.patch_size,
                patch_stride: Some(t.patch_stride),
                train_noise_interval: t.train_noise.to_cli(),
                val_noise_interval: t.val_noise.to_cli(),
                batch_size: t.batch_size,
                epochs: t.epochs,
                val_epoch: t.val_epoch,
                learning_rate: t.learning_rate,
                save_checkpoints: t.save_checkpoints,
                prefetch: t.prefetch,
                seed: t.seed,
            },
            inference: InferenceSection {
                test_path: i.test_path.to_string_lossy().into_owned(),
                output_path: i.output_path.to_string_lossy().into_owned(),
                noise_sigma: i.noise_sigma * noise::PIXEL_SCALE,
                add_noise: i.add_noise,
                seed: i.seed,
            },
            runtime: RuntimeSection {
                model_path: config.model_path.to_string_lossy().into_owned(),
                use_gpu: config.use_gpu,
                threads: config.threads,
                show_progress: t.show_progress && i.show_progress,
            },
        }
    }
}
