extern crate bincode;
extern crate burn;
extern crate clap;
extern crate image;
#[macro_use]
extern crate ndarray;
extern crate rand;
extern crate rand_distr;
extern crate rayon;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate xz2;

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_file;
pub mod constants;
pub mod data;
pub mod device;
pub mod error;
pub mod inference;
pub mod logging;
pub mod network;
pub mod psnr;
pub mod training;
pub mod validation;

pub use config::{ColorMode, InferenceConfig, NetworkConfig, RunConfig, TrainingConfig};
pub use error::{FfdnetError, Result};
pub use inference::{crop_padding, pad_to_even, InferenceDriver, InferenceReport, Padding};
pub use device::{select_device, CpuAutodiffBackend, CpuBackend, Device};
pub use network::{DenoisingNetwork, FfdNet};
pub use training::{adam, network_from_bytes, network_to_bytes, CheckpointStore, NetworkDescription, Trainer};
