use burn::backend::ndarray::NdArrayDevice;
use ffdnet_rust::cli;
use ffdnet_rust::commands;
use ffdnet_rust::config::ColorMode;
use ffdnet_rust::device::to_device_batch;
use ffdnet_rust::error::FfdnetError;
use ffdnet_rust::training::loss::{loss_value, squared_error};
use ffdnet_rust::training::CheckpointStore;
use ffdnet_rust::{CpuAutodiffBackend, CpuBackend, FfdNet};
use ndarray::Array4;
use std::fs;
use tempfile::TempDir;

mod test_helpers;
use test_helpers::*;

const DEVICE: NdArrayDevice = NdArrayDevice::Cpu;

#[test]
fn test_loss_is_summed() {
    let output = to_device_batch::<CpuBackend>(&Array4::from_elem((2, 1, 2, 2), 0.5f32), &DEVICE);
    let target = to_device_batch::<CpuBackend>(&Array4::zeros((2, 1, 2, 2)), &DEVICE);
    let loss = assert_ok(squared_error(output, target), "loss");
    assert!((loss_value(&loss) - 2.0).abs() < 1e-6);
}

#[test]
fn test_train_command_end_to_end() {
    let dir = TempDir::new().unwrap();
    let mut config = tiny_run_config(dir.path(), ColorMode::Gray);
    config.is_train = true;
    write_dataset(&config.training.train_path, ColorMode::Gray, 2, 1, 64);

    let summary = assert_ok(commands::train::<CpuAutodiffBackend>(&config, &DEVICE), "training");
    assert_eq!(summary.epochs, 1);
    assert_eq!(summary.train_losses.len(), 1);
    assert!(summary.train_losses[0].is_finite());
    assert_eq!(summary.val_losses.len(), 1);
    assert_eq!(summary.val_losses[0].0, 0);
    assert_eq!(summary.checkpoint, config.model_path.join("net_gray.pth"));
    assert!(summary.checkpoint.is_file());

    // the trained checkpoint loads into a fresh network of the same shape
    let fresh = assert_ok(FfdNet::<CpuBackend>::seeded(&config.network, Some(99), &DEVICE), "building network");
    assert_ok(CheckpointStore::new(&config.model_path).load(fresh, &DEVICE), "loading trained checkpoint");

    config.is_test = true;
    config.inference.add_noise = true;
    fs::create_dir_all(&config.inference.test_path).unwrap();
    write_gray_png(&config.inference.test_path.join("sample.png"), 21, 14, 3);

    let report = assert_ok(commands::test::<CpuBackend>(&config, &DEVICE), "testing");
    assert_eq!(report.images.len(), 1);
    assert!(config.inference.output_path.join("sample.png.png").is_file());
    assert!(config.inference.output_path.join("sample.png_noisy.png").is_file());
}

#[test]
fn test_rgb_training_writes_rgb_checkpoint() {
    let dir = TempDir::new().unwrap();
    let mut config = tiny_run_config(dir.path(), ColorMode::Rgb);
    config.is_train = true;
    config.training.train_noise = ffdnet_rust::data::NoiseInterval::from_cli([10, 10, 5]);
    write_dataset(&config.training.train_path, ColorMode::Rgb, 1, 1, 32);

    let summary = assert_ok(commands::train::<CpuAutodiffBackend>(&config, &DEVICE), "training");
    assert_eq!(summary.checkpoint.file_name().unwrap(), "net_rgb.pth");
}

#[test]
fn test_missing_split_directory() {
    let dir = TempDir::new().unwrap();
    let mut config = tiny_run_config(dir.path(), ColorMode::Gray);
    config.is_train = true;
    write_dataset(&config.training.train_path, ColorMode::Rgb, 1, 1, 32);

    match commands::train::<CpuAutodiffBackend>(&config, &DEVICE) {
        Err(FfdnetError::FileNotFound(path)) => assert!(path.ends_with("gray/train")),
        other => panic!("Expected FileNotFound, got {:?}", other.map(|s| s.epochs)),
    }
}

#[test]
fn test_dataset_without_large_enough_images() {
    let dir = TempDir::new().unwrap();
    let mut config = tiny_run_config(dir.path(), ColorMode::Gray);
    config.is_train = true;
    write_dataset(&config.training.train_path, ColorMode::Gray, 2, 1, 16);

    match commands::train::<CpuAutodiffBackend>(&config, &DEVICE) {
        Err(FfdnetError::EmptyDataset(_)) => (),
        other => panic!("Expected EmptyDataset, got {:?}", other.map(|s| s.epochs)),
    }
}

#[test]
fn test_zero_intervals_fail_before_training() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir.path().join("train_data"), ColorMode::Gray, 1, 1, 32);

    for (val_epoch, save_checkpoints) in vec![(0, 1), (1, 0)] {
        let mut config = tiny_run_config(dir.path(), ColorMode::Gray);
        config.is_train = true;
        config.training.val_epoch = val_epoch;
        config.training.save_checkpoints = save_checkpoints;

        match commands::train::<CpuAutodiffBackend>(&config, &DEVICE) {
            Err(FfdnetError::InvalidParameter(_)) => (),
            other => panic!("Expected InvalidParameter, got {:?}", other.map(|s| s.epochs)),
        }
        assert!(!config.model_path.join("net_gray.pth").exists());
    }
}

#[test]
fn test_test_command_rejects_out_of_range_sigma() {
    let dir = TempDir::new().unwrap();
    let mut config = tiny_run_config(dir.path(), ColorMode::Gray);
    config.is_test = true;
    config.inference.noise_sigma = 2.0;

    match commands::test::<CpuBackend>(&config, &DEVICE) {
        Err(FfdnetError::InvalidParameter(_)) => (),
        other => panic!("Expected InvalidParameter, got {:?}", other.map(|r| r.images.len())),
    }
}

#[test]
fn test_run_from_command_line() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_dataset(&root.join("train_data"), ColorMode::Gray, 1, 1, 32);
    fs::create_dir_all(root.join("test_data")).unwrap();
    write_gray_png(&root.join("test_data").join("x.png"), 10, 10, 0);

    let path = |name: &str| root.join(name).to_string_lossy().into_owned();
    let (train_path, model_path, test_path, output_path) =
        (path("train_data"), path("models"), path("test_data"), path("outputs"));
    let args = vec![
        "ffdnet", "--is_train", "--is_test", "--is_gray",
        "--train_path", train_path.as_str(), "--model_path", model_path.as_str(),
        "--test_path", test_path.as_str(), "--output_path", output_path.as_str(),
        "--features", "4", "--depth", "3", "--batch_size", "2",
        "--epoches", "1", "--val_epoch", "1",
        "--train_noise_interval", "0", "25", "25",
        "--val_noise_interval", "10", "10", "5",
        "--seed", "1", "--no_progress",
    ];
    let matches = assert_ok(cli::build_app().get_matches_from_safe(args), "parsing arguments");

    assert_ok(commands::run(&matches), "running");
    assert!(root.join("models").join("net_gray.pth").is_file());
    assert!(root.join("outputs").join("x.png.png").is_file());
}

#[test]
fn test_run_requires_a_mode() {
    let matches = assert_ok(cli::build_app().get_matches_from_safe(vec!["ffdnet", "--is_gray"]), "parsing");
    match commands::run(&matches) {
        Err(FfdnetError::Config(_)) => (),
        other => panic!("Expected Config error, got {:?}", other),
    }
}
