//! Path management for kindroid configuration files.
//!
//! ```text
//! ~/.config/kindroid/
//! └── secret.json     # API key, AI id and optional overrides
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

pub struct KindroidPaths;

impl KindroidPaths {
    /// Returns the configuration directory (`~/.config/kindroid`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeDirNotFound)?;
        Ok(home.join(".config").join("kindroid"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// The file holds the API key in plaintext. Keep it at mode 600.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }
}
