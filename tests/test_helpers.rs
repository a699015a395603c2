#![allow(dead_code)]
//! Shared helpers for the integration tests: result assertions and on-disk fixtures.

use ffdnet_rust::config::{ColorMode, NetworkConfig, RunConfig};
use ffdnet_rust::data::NoiseInterval;
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Assert that a Result is Ok and return the unwrapped value.
pub fn assert_ok<T, E: Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok result for {}, but got error: {:?}", context, err),
    }
}

/// Assert that a Result is Err and return the error.
pub fn assert_err<T: Debug, E>(result: Result<T, E>, context: &str) -> E {
    match result {
        Err(err) => err,
        Ok(val) => panic!("Expected Err result for {}, but got Ok: {:?}", context, val),
    }
}

/// Deterministic texture so patches differ from each other.
fn pixel(x: u32, y: u32, c: u32, seed: u32) -> u8 {
    ((x * 7 + y * 13 + c * 29 + seed * 31) % 256) as u8
}

pub fn write_gray_png(path: &Path, width: u32, height: u32, seed: u32) {
    let image = GrayImage::from_fn(width, height, |x, y| Luma([pixel(x, y, 0, seed)]));
    assert_ok(image.save(path), "writing gray fixture");
}

pub fn write_rgb_png(path: &Path, width: u32, height: u32, seed: u32) {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([pixel(x, y, 0, seed), pixel(x, y, 1, seed), pixel(x, y, 2, seed)])
    });
    assert_ok(image.save(path), "writing rgb fixture");
}

/// Lays out `root/<mode>/{train,val}` with square images of side `size`.
pub fn write_dataset(root: &Path, color: ColorMode, train: usize, val: usize, size: u32) {
    for (split, count) in &[("train", train), ("val", val)] {
        let dir = root.join(color.to_string()).join(split);
        assert_ok(fs::create_dir_all(&dir), "creating dataset dir");
        for i in 0..*count {
            let path = dir.join(format!("{:03}.png", i));
            match color {
                ColorMode::Gray => write_gray_png(&path, size, size, i as u32),
                ColorMode::Rgb => write_rgb_png(&path, size, size, i as u32),
            }
        }
    }
}

/// A configuration small enough to train and test in well under a second.
pub fn tiny_run_config(root: &Path, color: ColorMode) -> RunConfig {
    let mut config = RunConfig::new(color);
    config.network = NetworkConfig::builder(color).features(4).depth(3).build();
    config.model_path = root.join("models");

    let training = &mut config.training;
    training.train_path = root.join("train_data");
    training.patch_size = 32;
    training.patch_stride = 32;
    training.train_noise = NoiseInterval::from_cli([0, 50, 25]);
    training.val_noise = NoiseInterval::from_cli([0, 30, 30]);
    training.batch_size = 4;
    training.epochs = 1;
    training.val_epoch = 1;
    training.save_checkpoints = 1;
    training.learning_rate = 1e-4;
    training.prefetch = 1;
    training.seed = Some(11);
    training.show_progress = false;

    let inference = &mut config.inference;
    inference.test_path = root.join("test_data");
    inference.output_path = root.join("outputs");
    inference.seed = Some(5);
    inference.show_progress = false;
    config
}

pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = assert_ok(fs::read_dir(dir), "listing directory")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    files.sort();
    files
}
