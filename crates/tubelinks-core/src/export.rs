//! CSV serialization of the checked rows and the hand-off to a download sink.

use crate::record::LinkRecord;
use crate::selection::Selection;
use crate::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::PathBuf;

/// First line of every export
pub const CSV_HEADER: &str = "链接地址,标题";

/// MIME type attached to the exported payload
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8;";

/// A payload to be saved somewhere outside this crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub filename: String,
    /// Ask the user where to save instead of saving silently
    pub save_as: bool,
}

/// Where a download ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    pub path: PathBuf,
    pub bytes_written: usize,
}

/// The file-saving collaborator
pub trait Downloader {
    fn download(&self, request: DownloadRequest) -> Result<DownloadReceipt>;
}

/// Quote a CSV field, doubling any embedded double quotes
///
/// Newlines and commas get no special treatment beyond the surrounding quotes.
pub fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Build the CSV text for the given records, header first
pub fn build_csv<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a LinkRecord>,
{
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for record in records {
        csv.push_str(&quote_field(record.url()));
        csv.push(',');
        csv.push_str(&quote_field(record.text()));
        csv.push('\n');
    }
    csv
}

/// `links_<timestamp>.csv`, with `:` and `.` in the timestamp turned into `-`
pub fn export_filename(now: DateTime<Utc>) -> String {
    let timestamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("links_{}.csv", timestamp)
}

/// Build the download request for the checked rows, if any are checked
pub fn download_request(selection: &Selection, now: DateTime<Utc>) -> Option<DownloadRequest> {
    let records = selection.checked_records();
    if records.is_empty() {
        return None;
    }

    Some(DownloadRequest {
        bytes: build_csv(records).into_bytes(),
        mime: CSV_MIME_TYPE.to_string(),
        filename: export_filename(now),
        save_as: true,
    })
}

/// Serialize the checked rows and pass them to the downloader
///
/// Nothing is handed to the downloader when no row is checked.
pub fn export_selection(
    selection: &Selection,
    downloader: &dyn Downloader,
    now: DateTime<Utc>,
) -> Result<Option<DownloadReceipt>> {
    let Some(request) = download_request(selection, now) else {
        tracing::debug!("Export skipped: no rows checked");
        return Ok(None);
    };

    tracing::info!(
        "Exporting {} rows to {}",
        selection.checked_count(),
        request.filename
    );

    downloader.download(request).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingDownloader {
        requests: RefCell<Vec<DownloadRequest>>,
    }

    impl Downloader for RecordingDownloader {
        fn download(&self, request: DownloadRequest) -> Result<DownloadReceipt> {
            let receipt = DownloadReceipt {
                path: PathBuf::from(&request.filename),
                bytes_written: request.bytes.len(),
            };
            self.requests.borrow_mut().push(request);
            Ok(receipt)
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap() + chrono::Duration::milliseconds(42)
    }

    #[test]
    fn test_csv_doubles_embedded_quotes() {
        let record = LinkRecord::new("https://a.com/x?y=\"z\"", "Title, with \"quotes\"");
        let csv = build_csv([&record]);

        assert_eq!(
            csv,
            "链接地址,标题\n\"https://a.com/x?y=\"\"z\"\"\",\"Title, with \"\"quotes\"\"\"\n"
        );
    }

    #[test]
    fn test_csv_leaves_newlines_alone() {
        let record = LinkRecord::new("https://example.com", "line one\nline two");
        let csv = build_csv([&record]);
        assert!(csv.ends_with("\"https://example.com\",\"line one\nline two\"\n"));
    }

    #[test]
    fn test_csv_with_no_records_is_header_only() {
        assert_eq!(build_csv(std::iter::empty()), "链接地址,标题\n");
    }

    #[test]
    fn test_export_filename_has_no_colons_or_periods() {
        let name = export_filename(fixed_now());

        assert_eq!(name, "links_2024-03-05T14-07-09-042Z.csv");
        let stem = name.strip_suffix(".csv").unwrap();
        assert!(stem.starts_with("links_"));
        assert!(!stem.contains(':'));
        assert!(!stem.contains('.'));
    }

    #[test]
    fn test_export_with_nothing_checked_does_not_download() {
        let mut selection = Selection::new(vec![
            LinkRecord::new("https://www.youtube.com/watch?v=AAA", "Video A"),
            LinkRecord::new("https://example.com/page", "Example Page"),
        ]);
        selection.select_all(false);
        let downloader = RecordingDownloader::default();

        let receipt = export_selection(&selection, &downloader, fixed_now()).unwrap();

        assert!(receipt.is_none());
        assert!(downloader.requests.borrow().is_empty());
    }

    #[test]
    fn test_export_hands_checked_rows_to_downloader() {
        let mut selection = Selection::new(vec![
            LinkRecord::new("https://www.youtube.com/watch?v=AAA", "Video A"),
            LinkRecord::new("https://www.youtube.com/watch?v=BBB", "Video B"),
            LinkRecord::new("https://example.com/page", "Example Page"),
        ]);
        selection.set_checked(1, true).unwrap();
        let downloader = RecordingDownloader::default();

        let receipt = export_selection(&selection, &downloader, fixed_now())
            .unwrap()
            .unwrap();

        let requests = downloader.requests.borrow();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.mime, CSV_MIME_TYPE);
        assert!(request.save_as);
        assert_eq!(request.filename, "links_2024-03-05T14-07-09-042Z.csv");
        assert_eq!(
            String::from_utf8(request.bytes.clone()).unwrap(),
            "链接地址,标题\n\"https://www.youtube.com/watch?v=BBB\",\"Video B\"\n\"https://example.com/page\",\"Example Page\"\n"
        );
        assert_eq!(receipt.bytes_written, request.bytes.len());
    }
}
