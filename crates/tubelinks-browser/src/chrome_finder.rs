use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Executable names looked up on `PATH` after the well-known install locations
const PATH_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Locates a Chrome or Chromium binary
pub struct ChromeFinder {
    custom_path: Option<PathBuf>,
}

impl ChromeFinder {
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    /// Find Chrome: the custom path if given, then install locations, then `PATH`
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.custom_path {
            return validate_chrome_path(path);
        }

        if let Some(found) = Self::default_paths()
            .iter()
            .find_map(|path| validate_chrome_path(path).ok())
        {
            tracing::debug!("Chrome found at install location {}", found.display());
            return Ok(found);
        }

        if let Some(found) = PATH_NAMES
            .iter()
            .find_map(|name| which::which(name).ok())
            .and_then(|path| validate_chrome_path(&path).ok())
        {
            tracing::debug!("Chrome found on PATH at {}", found.display());
            return Ok(found);
        }

        Err(Error::Browser(format!(
            "Chrome not found. Checked: {} and PATH ({}). \
             Use --chrome-path or TUBELINKS_CHROME_PATH to specify location.",
            Self::default_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            PATH_NAMES.join(", ")
        )))
    }

    fn default_paths() -> Vec<PathBuf> {
        #[cfg(target_os = "macos")]
        return vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ];

        #[cfg(target_os = "linux")]
        return vec![
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/snap/bin/chromium"),
        ];

        #[cfg(target_os = "windows")]
        return vec![
            PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        return vec![];
    }
}

/// Check the path exists and, on unix, is executable
fn validate_chrome_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::Browser(format!(
            "Chrome not found at: {}",
            path.display()
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)?.permissions().mode();
        if mode & 0o111 == 0 {
            return Err(Error::Browser(format!(
                "Chrome binary not executable: {}",
                path.display()
            )));
        }
    }

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_custom_path() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let path = temp.path();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let found = ChromeFinder::new(Some(path.to_path_buf())).find().unwrap();
        assert_eq!(found, path);
    }

    #[test]
    fn test_missing_custom_path_is_not_found() {
        let finder = ChromeFinder::new(Some(PathBuf::from("/nonexistent/chrome")));
        let err = finder.find().unwrap_err();

        assert!(err.to_string().contains("Chrome not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_non_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::set_permissions(temp.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

        let err = ChromeFinder::new(Some(temp.path().to_path_buf()))
            .find()
            .unwrap_err();
        assert!(err.to_string().contains("not executable"));
    }
}
