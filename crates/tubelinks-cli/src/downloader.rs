use anyhow::anyhow;
use console::Term;
use std::path::{Path, PathBuf};
use tubelinks_core::{DownloadReceipt, DownloadRequest, Downloader};

/// Saves export payloads as files
pub struct FileDownloader {
    dir: PathBuf,
    prompt: bool,
}

impl FileDownloader {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, prompt: false }
    }

    /// Ask for a path on the terminal when a request wants "save as"
    pub fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    /// The user's Downloads folder, or the current directory
    pub fn default_dir() -> anyhow::Result<PathBuf> {
        match dirs::download_dir() {
            Some(dir) => Ok(dir),
            None => std::env::current_dir()
                .map_err(|e| anyhow!("Could not determine a download directory: {}", e)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ask_path(&self, suggested: PathBuf) -> std::io::Result<PathBuf> {
        let term = Term::stderr();
        term.write_str(&format!("Save as [{}]: ", suggested.display()))?;
        let answer = term.read_line()?;
        Ok(resolve_answer(answer.trim(), suggested))
    }
}

impl Downloader for FileDownloader {
    fn download(&self, request: DownloadRequest) -> tubelinks_core::Result<DownloadReceipt> {
        let mut path = self.dir.join(&request.filename);
        if request.save_as && self.prompt {
            path = self.ask_path(path)?;
        }

        tracing::debug!(
            "Saving {} bytes of {} to {}",
            request.bytes.len(),
            request.mime,
            path.display()
        );

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &request.bytes)?;

        tracing::info!("Wrote {}", path.display());

        Ok(DownloadReceipt {
            path,
            bytes_written: request.bytes.len(),
        })
    }
}

/// Turn a "save as" answer into a path: empty keeps the suggestion, a
/// directory receives the suggested file name
fn resolve_answer(answer: &str, suggested: PathBuf) -> PathBuf {
    if answer.is_empty() {
        return suggested;
    }

    let answer = PathBuf::from(answer);
    if answer.is_dir() {
        match suggested.file_name() {
            Some(name) => answer.join(name),
            None => answer,
        }
    } else {
        answer
    }
}
