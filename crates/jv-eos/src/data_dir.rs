//! EOS data directory resolution.

use crate::error::{EosError, EosResult};
use std::path::{Path, PathBuf};

/// Environment variable naming the EOS data directory.
pub const DATA_DIR_ENV: &str = "JOVIAN_EOS_DIR";

/// An explicit path wins over the environment. Either way the directory must exist.
pub fn resolve_data_dir(explicit: Option<&Path>) -> EosResult<PathBuf> {
    let dir = match explicit {
        Some(path) => path.to_path_buf(),
        None => match std::env::var_os(DATA_DIR_ENV) {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => {
                return Err(EosError::init(
                    PathBuf::new(),
                    format!("no EOS data directory given and {DATA_DIR_ENV} is not set"),
                ));
            }
        },
    };
    if !dir.is_dir() {
        return Err(EosError::init(&dir, "EOS data directory does not exist"));
    }
    Ok(dir)
}
