use std::io;
use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FfdnetError {
	#[error("IO error: {0}")]
	Io(#[from] io::Error),

	#[error("Image processing error: {0}")]
	Image(#[from] image::ImageError),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Invalid parameter: {0}")]
	InvalidParameter(String),

	#[error("Invalid input: {0}")]
	InvalidInput(String),

	#[error("File not found: {}", .0.display())]
	FileNotFound(PathBuf),

	#[error("Empty dataset: {0}")]
	EmptyDataset(String),

	#[error("Shape mismatch: {0}")]
	ShapeMismatch(String),

	#[error("Serialization error: {0}")]
	Serialization(String),

	#[error("Training error: {0}")]
	Training(String),
}

impl From<ndarray::ShapeError> for FfdnetError {
	fn from(err: ndarray::ShapeError) -> Self {
		FfdnetError::ShapeMismatch(err.to_string())
	}
}

impl From<bincode::Error> for FfdnetError {
	fn from(err: bincode::Error) -> Self {
		FfdnetError::Serialization(err.to_string())
	}
}

impl From<burn::record::RecorderError> for FfdnetError {
	fn from(err: burn::record::RecorderError) -> Self {
		FfdnetError::Serialization(format!("Module record error: {:?}", err))
	}
}

impl From<ParseIntError> for FfdnetError {
	fn from(err: ParseIntError) -> Self {
		FfdnetError::Parse(format!("Failed to parse integer: {}", err))
	}
}

impl From<ParseFloatError> for FfdnetError {
	fn from(err: ParseFloatError) -> Self {
		FfdnetError::Parse(format!("Failed to parse float: {}", err))
	}
}

pub type Result<T> = std::result::Result<T, FfdnetError>;
