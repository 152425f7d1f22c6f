use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// A Chrome user-data directory, either throwaway or kept between runs
///
/// Persistent profiles keep the YouTube login, so subscription feeds can be
/// scanned without signing in every time.
pub struct ProfileManager {
    path: PathBuf,
    is_temporary: bool,
}

impl ProfileManager {
    /// Create a temporary profile that is deleted on drop
    pub fn temporary() -> Result<Self> {
        let path = tempfile::Builder::new()
            .prefix("tubelinks-profile-")
            .tempdir()?
            .keep();

        tracing::debug!("Created temporary profile at {}", path.display());

        Ok(Self {
            path,
            is_temporary: true,
        })
    }

    /// Use (and create if needed) a persistent profile at the given path
    pub fn persistent(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }

        Ok(Self {
            path,
            is_temporary: false,
        })
    }

    /// Persistent profile stored by name under [`ProfileManager::profiles_dir`]
    pub fn named(name: &str) -> Result<Self> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::Browser(format!("Invalid profile name: '{}'", name)));
        }
        Self::persistent(Self::profiles_dir()?.join(name))
    }

    /// `~/.tubelinks/profiles`
    pub fn profiles_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".tubelinks").join("profiles"))
            .ok_or_else(|| Error::Browser("Could not determine home directory".to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }
}

impl Drop for ProfileManager {
    fn drop(&mut self) {
        if self.is_temporary && self.path.exists() {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}
