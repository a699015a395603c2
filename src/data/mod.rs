pub mod image_io;
pub mod loader;
pub mod noise;
pub mod patches;

pub use self::image_io::{dataset_dir, list_files, load_images, read_image, write_image, Split};
pub use self::loader::{BatchLoader, Batches, PatchDataset};
pub use self::noise::{add_noise, noise_levels_for_batch, NoiseInterval};
pub use self::patches::{image_to_patches, images_to_patches};
