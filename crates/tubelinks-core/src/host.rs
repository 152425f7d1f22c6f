use crate::error::AcquisitionError;
use crate::record::LinkRecord;
use async_trait::async_trait;
use std::fmt;

/// Which tab the extractor should run in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TabTarget {
    /// The tab the user is looking at
    #[default]
    Active,
    /// The first tab whose address contains this text
    UrlContains(String),
}

impl fmt::Display for TabTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabTarget::Active => write!(f, "active tab"),
            TabTarget::UrlContains(needle) => write!(f, "tab matching '{}'", needle),
        }
    }
}

/// Runs the extractor inside a tab and returns its result
///
/// One request, one response; the implementation owns whatever channel it
/// uses to reach the page.
#[async_trait]
pub trait TabScripting: Send + Sync {
    async fn run_extractor(
        &self,
        target: &TabTarget,
    ) -> std::result::Result<Vec<LinkRecord>, AcquisitionError>;
}
