//! Offline scanning of a saved page.
//!
//! A page saved from the browser ("Save page as", or the output of
//! `document.documentElement.outerHTML`) stands in for the live tab.

use crate::OutputFormat;
use crate::session::{self, SessionArgs};
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tubelinks_core::extractor;
use tubelinks_core::{AcquisitionError, LinkRecord, PageSnapshot, Presenter, TabScripting, TabTarget};

/// A tab host backed by an HTML file on disk
pub struct SavedPage {
    path: PathBuf,
    page_url: String,
    page_title: Option<String>,
}

impl SavedPage {
    pub fn new(path: PathBuf, page_url: String, page_title: Option<String>) -> Self {
        Self {
            path,
            page_url,
            page_title,
        }
    }

    pub fn snapshot(&self) -> std::io::Result<PageSnapshot> {
        let html = std::fs::read_to_string(&self.path)?;
        Ok(PageSnapshot::new(
            self.page_url.clone(),
            self.page_title.clone(),
            html,
        ))
    }
}

#[async_trait]
impl TabScripting for SavedPage {
    async fn run_extractor(
        &self,
        _target: &TabTarget,
    ) -> std::result::Result<Vec<LinkRecord>, AcquisitionError> {
        tracing::debug!("Reading saved page {}", self.path.display());
        let snapshot = self
            .snapshot()
            .map_err(|e| AcquisitionError::new(format!("{}: {}", self.path.display(), e)))?;
        Ok(extractor::extract_from_snapshot(&snapshot))
    }
}

pub fn execute(
    file: &Path,
    page_url: String,
    page_title: Option<String>,
    args: &SessionArgs,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Scanning saved page: {}", file.display());

    let host = SavedPage::new(file.to_path_buf(), page_url, page_title);
    let mut presenter = Presenter::with_delay(args.delay());

    let runtime = super::runtime()?;
    runtime.block_on(session::acquire(&mut presenter, &host, &TabTarget::Active))?;

    session::run(&mut presenter, args, format)
}
