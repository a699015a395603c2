pub mod checkpoint;
pub mod loss;
pub mod optimizer;
pub mod progress;
pub mod trainer;
pub mod validation;

pub use self::checkpoint::{network_from_bytes, network_to_bytes, CheckpointStore, NetworkDescription};
pub use self::optimizer::adam;
pub use self::trainer::{Trainer, TrainingSummary};
pub use self::validation::validate;
