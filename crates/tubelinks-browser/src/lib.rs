//! Chrome discovery, launch, and CDP access to tabs for link extraction.

mod cdp_session;
mod chrome_finder;
mod error;
mod launcher;
mod profile;

pub use cdp_session::{CdpSession, ChromeEndpoint, check_scriptable};
pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use launcher::{ChromeLauncher, DEFAULT_DEBUGGING_PORT, normalize_url};
pub use profile::ProfileManager;
