use ffdnet_rust::psnr::psnr;
use ndarray::{Array3, Array4};

#[test]
fn test_psnr_identical_images() {
    let image = Array3::<f32>::from_elem((3, 10, 10), 0.7);
    assert_eq!(psnr(&image, &image, 1.0).unwrap(), f32::INFINITY);
}

#[test]
fn test_psnr_known_value() {
    let image1 = Array3::<f32>::zeros((1, 8, 8));
    let image2 = Array3::<f32>::from_elem((1, 8, 8), 0.1);
    // mse 0.01 -> 20 dB
    let value = psnr(&image1, &image2, 1.0).unwrap();
    assert!((value - 20.0).abs() < 1e-3, "got {}", value);
}

#[test]
fn test_psnr_clamps_out_of_range_values() {
    let clean = Array3::<f32>::from_elem((1, 4, 4), 1.0);
    let noisy = Array3::<f32>::from_elem((1, 4, 4), 1.5);
    assert_eq!(psnr(&noisy, &clean, 1.0).unwrap(), f32::INFINITY);
}

#[test]
fn test_psnr_improves_with_smaller_error() {
    let clean = Array4::<f32>::from_elem((1, 3, 6, 6), 0.5);
    let near = clean.mapv(|v| v + 0.01);
    let far = clean.mapv(|v| v + 0.2);
    assert!(psnr(&near, &clean, 1.0).unwrap() > psnr(&far, &clean, 1.0).unwrap());
}

#[test]
fn test_psnr_different_sizes() {
    let image1 = Array3::<f32>::ones((1, 10, 10));
    let image2 = Array3::<f32>::ones((1, 8, 12));
    assert!(psnr(&image1, &image2, 1.0).is_err());
}

#[test]
fn test_psnr_empty_image() {
    let image = Array3::<f32>::zeros((1, 0, 4));
    assert!(psnr(&image, &image, 1.0).is_err());
}
