use crate::OutputFormat;
use crate::session::{self, SessionArgs};
use anyhow::Result;
use tubelinks_browser::ChromeEndpoint;
use tubelinks_core::{Presenter, TabTarget};

/// Attach to a Chrome started with `--remote-debugging-port` and scan one tab
pub fn execute(
    port: u16,
    tab: Option<String>,
    args: &SessionArgs,
    format: OutputFormat,
) -> Result<()> {
    let target = tab.map(TabTarget::UrlContains).unwrap_or_default();
    let mut presenter = Presenter::with_delay(args.delay());

    let runtime = super::runtime()?;
    let host = ChromeEndpoint::new(port);
    let acquired = runtime.block_on(session::acquire(&mut presenter, &host, &target));
    runtime.shutdown_timeout(std::time::Duration::from_millis(100));
    acquired?;

    session::run(&mut presenter, args, format)
}
