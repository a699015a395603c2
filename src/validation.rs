use crate::error::{FfdnetError, Result};
use std::path::{Path, PathBuf};

/// Validates that an input path is an existing file or directory
pub fn validate_input_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(FfdnetError::FileNotFound(path.to_path_buf()));
    }

    if !path.is_file() && !path.is_dir() {
        return Err(FfdnetError::InvalidInput(format!(
            "{} is neither a file nor a directory",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Validates that a directory exists
pub fn validate_directory(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(FfdnetError::FileNotFound(path.to_path_buf()));
    }

    if !path.is_dir() {
        return Err(FfdnetError::InvalidInput(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Validates that an output directory either exists as a directory or can be created
pub fn validate_output_dir(path: &Path) -> Result<PathBuf> {
    if path.exists() && !path.is_dir() {
        return Err(FfdnetError::InvalidInput(format!(
            "{} exists but is not a directory",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}
