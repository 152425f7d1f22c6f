//! Drives one session: acquire links once, let the user select, export.
//!
//! ```text
//! Loading --ok--> Ready --export--> Exporting --> Ready
//!    \
//!     `--err--> Error (terminal)
//! ```

use crate::error::AcquisitionError;
use crate::export::{self, DownloadReceipt, Downloader};
use crate::host::{TabScripting, TabTarget};
use crate::selection::Selection;
use crate::table::TableView;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Wait before asking the tab for links, so lazily rendered titles can appear
pub const DEFAULT_ACQUISITION_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterState {
    Loading,
    Ready {
        selection: Selection,
        /// State of the select-all control itself
        select_all: bool,
    },
    /// The selection is lent to the export while in this state
    Exporting,
    Error(String),
}

impl PresenterState {
    pub fn name(&self) -> &'static str {
        match self {
            PresenterState::Loading => "loading",
            PresenterState::Ready { .. } => "ready",
            PresenterState::Exporting => "exporting",
            PresenterState::Error(_) => "error",
        }
    }
}

pub struct Presenter {
    state: PresenterState,
    delay: Duration,
}

impl Presenter {
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_ACQUISITION_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            state: PresenterState::Loading,
            delay,
        }
    }

    pub fn state(&self) -> &PresenterState {
        &self.state
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait the fixed delay, then run the extractor once in the target tab
    ///
    /// Only valid while loading. On failure the presenter ends in the
    /// terminal error state carrying the user-visible message.
    pub async fn acquire(
        &mut self,
        host: &dyn TabScripting,
        target: &TabTarget,
    ) -> Result<()> {
        if self.state != PresenterState::Loading {
            return Err(Error::InvalidState(format!(
                "links are acquired once, presenter is {}",
                self.state.name()
            )));
        }

        if !self.delay.is_zero() {
            tracing::debug!("Waiting {:?} before scanning {}", self.delay, target);
            tokio::time::sleep(self.delay).await;
        }

        tracing::info!("Requesting links from {}", target);
        match host.run_extractor(target).await {
            Ok(records) => {
                tracing::info!("Received {} link records", records.len());
                self.state = PresenterState::Ready {
                    selection: Selection::new(records),
                    select_all: false,
                };
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Link acquisition failed: {}", err);
                self.fail(err.clone());
                Err(err.into())
            }
        }
    }

    /// Move into the terminal error state
    pub fn fail(&mut self, err: AcquisitionError) {
        self.state = PresenterState::Error(err.to_string());
    }

    /// The message that replaces the loading indicator, once failed
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            PresenterState::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        match &self.state {
            PresenterState::Ready { selection, .. } => Some(selection),
            _ => None,
        }
    }

    /// Flip one row's checkbox (0-based index)
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        let (selection, _) = self.ready_mut()?;
        selection.toggle(index)
    }

    /// Set the select-all control and apply it to every row
    pub fn set_select_all(&mut self, checked: bool) -> Result<()> {
        let (selection, select_all) = self.ready_mut()?;
        *select_all = checked;
        selection.select_all(checked);
        Ok(())
    }

    /// Click the select-all control, returning its new state
    pub fn toggle_select_all(&mut self) -> Result<bool> {
        let (_, select_all) = self.ready_mut()?;
        let checked = !*select_all;
        self.set_select_all(checked)?;
        Ok(checked)
    }

    pub fn export_enabled(&self) -> bool {
        match &self.state {
            PresenterState::Ready { selection, .. } => selection.export_enabled(),
            _ => false,
        }
    }

    /// Render the current table
    pub fn table(&self, width: usize) -> Result<TableView> {
        match &self.state {
            PresenterState::Ready {
                selection,
                select_all,
            } => Ok(TableView::render(selection, *select_all, width)),
            other => Err(Error::InvalidState(format!(
                "no table while {}",
                other.name()
            ))),
        }
    }

    /// Export the checked rows through the downloader
    ///
    /// Returns `Ok(None)` without calling the downloader when nothing is
    /// checked. The presenter is back in `Ready` afterwards, even when the
    /// download itself failed.
    pub fn export(
        &mut self,
        downloader: &dyn Downloader,
        now: DateTime<Utc>,
    ) -> Result<Option<DownloadReceipt>> {
        let (selection, select_all) =
            match std::mem::replace(&mut self.state, PresenterState::Exporting) {
                PresenterState::Ready {
                    selection,
                    select_all,
                } => (selection, select_all),
                other => {
                    let err = Error::InvalidState(format!("cannot export while {}", other.name()));
                    self.state = other;
                    return Err(err);
                }
            };

        let result = export::export_selection(&selection, downloader, now);

        self.state = PresenterState::Ready {
            selection,
            select_all,
        };
        result
    }

    fn ready_mut(&mut self) -> Result<(&mut Selection, &mut bool)> {
        match &mut self.state {
            PresenterState::Ready {
                selection,
                select_all,
            } => Ok((selection, select_all)),
            other => Err(Error::InvalidState(format!(
                "selection unavailable while {}",
                other.name()
            ))),
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{DownloadReceipt, DownloadRequest};
    use crate::record::LinkRecord;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    struct StaticHost {
        result: std::result::Result<Vec<LinkRecord>, AcquisitionError>,
        calls: AtomicUsize,
    }

    impl StaticHost {
        fn ok(records: Vec<LinkRecord>) -> Self {
            Self {
                result: Ok(records),
                calls: AtomicUsize::new(0),
            }
        }

        fn err(err: AcquisitionError) -> Self {
            Self {
                result: Err(err),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TabScripting for StaticHost {
        async fn run_extractor(
            &self,
            _target: &TabTarget,
        ) -> std::result::Result<Vec<LinkRecord>, AcquisitionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[derive(Default)]
    struct RecordingDownloader {
        requests: RefCell<Vec<DownloadRequest>>,
        fail: bool,
    }

    impl Downloader for RecordingDownloader {
        fn download(&self, request: DownloadRequest) -> Result<DownloadReceipt> {
            if self.fail {
                return Err(Error::Download("disk full".to_string()));
            }
            let receipt = DownloadReceipt {
                path: PathBuf::from(&request.filename),
                bytes_written: request.bytes.len(),
            };
            self.requests.borrow_mut().push(request);
            Ok(receipt)
        }
    }

    fn sample_records() -> Vec<LinkRecord> {
        vec![
            LinkRecord::new("https://www.youtube.com/watch?v=AAA", "Video A"),
            LinkRecord::new("https://example.com/page", "Example Page"),
        ]
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    async fn ready_presenter() -> Presenter {
        let mut presenter = Presenter::with_delay(Duration::ZERO);
        let host = StaticHost::ok(sample_records());
        presenter.acquire(&host, &TabTarget::Active).await.unwrap();
        presenter
    }

    #[tokio::test]
    async fn test_acquire_moves_to_ready() {
        let presenter = ready_presenter().await;

        let table = presenter.table(60).unwrap();
        assert_eq!(table.rows().len(), 2);
        assert!(!table.rows()[0].checked);
        assert!(table.rows()[1].checked);
        assert!(presenter.export_enabled());
    }

    #[tokio::test]
    async fn test_acquire_waits_for_delay() {
        let delay = Duration::from_millis(20);
        let mut presenter = Presenter::with_delay(delay);
        let host = StaticHost::ok(sample_records());

        let started = Instant::now();
        presenter.acquire(&host, &TabTarget::Active).await.unwrap();

        assert!(started.elapsed() >= delay);
        assert_eq!(host.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_acquire_failure_is_terminal() {
        let mut presenter = Presenter::with_delay(Duration::ZERO);
        let host = StaticHost::err(AcquisitionError::new("No tab with given id"));

        let err = presenter
            .acquire(&host, &TabTarget::Active)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Acquisition(_)));
        assert_eq!(
            presenter.error_message(),
            Some("获取链接失败: No tab with given id")
        );
        assert!(presenter.table(60).is_err());
        assert!(presenter.toggle(0).is_err());
        assert!(!presenter.export_enabled());

        let retry = StaticHost::ok(sample_records());
        assert!(presenter.acquire(&retry, &TabTarget::Active).await.is_err());
        assert_eq!(retry.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_result_reports_unknown_error() {
        let mut presenter = Presenter::with_delay(Duration::ZERO);
        let host = StaticHost::err(AcquisitionError::no_result());

        let _ = presenter.acquire(&host, &TabTarget::Active).await;

        assert_eq!(presenter.error_message(), Some("获取链接失败: 未知错误"));
    }

    #[tokio::test]
    async fn test_select_all_toggles_every_row() {
        let mut presenter = ready_presenter().await;

        assert!(presenter.toggle_select_all().unwrap());
        let table = presenter.table(60).unwrap();
        assert!(table.rows().iter().all(|row| row.checked));
        assert!(table.export_enabled());

        assert!(!presenter.toggle_select_all().unwrap());
        let table = presenter.table(60).unwrap();
        assert!(table.rows().iter().all(|row| !row.checked));
        assert!(!presenter.export_enabled());
    }

    #[tokio::test]
    async fn test_export_returns_to_ready() {
        let mut presenter = ready_presenter().await;
        presenter.toggle(0).unwrap();
        let downloader = RecordingDownloader::default();

        let receipt = presenter.export(&downloader, now()).unwrap();

        assert!(receipt.is_some());
        assert!(matches!(presenter.state(), PresenterState::Ready { .. }));
        let requests = downloader.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].filename, "links_2024-01-02T03-04-05-000Z.csv");
    }

    #[tokio::test]
    async fn test_export_without_selection_skips_download() {
        let mut presenter = ready_presenter().await;
        presenter.set_select_all(false).unwrap();
        let downloader = RecordingDownloader::default();

        assert!(presenter.export(&downloader, now()).unwrap().is_none());
        assert!(downloader.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_failed_download_keeps_selection() {
        let mut presenter = ready_presenter().await;
        let downloader = RecordingDownloader {
            fail: true,
            ..Default::default()
        };

        assert!(presenter.export(&downloader, now()).is_err());
        assert_eq!(presenter.selection().unwrap().checked_count(), 1);
    }

    #[test]
    fn test_export_while_loading_is_rejected() {
        let mut presenter = Presenter::new();
        let downloader = RecordingDownloader::default();

        assert!(presenter.export(&downloader, now()).is_err());
        assert_eq!(presenter.state(), &PresenterState::Loading);
        assert_eq!(presenter.delay(), DEFAULT_ACQUISITION_DELAY);
    }
}
