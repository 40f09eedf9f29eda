//! Clean the output directory

use std::fs;

use crate::error::BuildError;
use crate::Pear;

/// Remove the output directory. A missing directory is only a warning.
pub fn run(pear: &Pear) -> Result<(), BuildError> {
    if pear.output_dir.exists() {
        fs::remove_dir_all(&pear.output_dir).map_err(|e| BuildError::io(&pear.output_dir, e))?;
        tracing::info!("Deleted: {:?}", pear.output_dir);
    } else {
        tracing::warn!("Nothing to clean, {:?} does not exist", pear.output_dir);
    }

    Ok(())
}
