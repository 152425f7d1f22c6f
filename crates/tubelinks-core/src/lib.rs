pub mod error;
pub mod export;
pub mod extractor;
pub mod host;
pub mod presenter;
pub mod record;
pub mod selection;
pub mod table;

pub use error::{AcquisitionError, Error, Result};
pub use export::{DownloadReceipt, DownloadRequest, Downloader};
pub use host::{TabScripting, TabTarget};
pub use presenter::{Presenter, PresenterState};
pub use record::{LinkRecord, PageSnapshot};
pub use selection::Selection;
pub use table::TableView;
