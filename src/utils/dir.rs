use std::{
    env, io,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};

pub const DATA_FILE_NAME: &str = "data.json";

/// Resolves the per-user application directory and makes sure it exists.
/// On Windows this is `%APPDATA%\hourtrack`, elsewhere `$HOME/.hourtrack`.
pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path = env::var("APPDATA")
                .map(PathBuf::from)
                .map_err(|_| anyhow!("APPDATA should be present on Windows"))?;
            path.push("hourtrack");
            path
        }
        #[cfg(not(windows))]
        {
            let mut path = env::var("HOME")
                .map(PathBuf::from)
                .map_err(|_| anyhow!("Couldn't find HOME to place the data directory in"))?;
            path.push(".hourtrack");
            path
        }
    };

    ensure_dir(path)
}

pub fn ensure_dir(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

pub fn data_file_path(app_dir: &Path) -> PathBuf {
    app_dir.join(DATA_FILE_NAME)
}
