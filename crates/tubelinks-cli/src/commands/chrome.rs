use crate::OutputFormat;
use crate::session::{self, SessionArgs};
use anyhow::Result;
use console::Term;
use std::path::PathBuf;
use std::process::Child;
use tubelinks_browser::{ChromeEndpoint, ChromeFinder, ChromeLauncher, ProfileManager};
use tubelinks_core::{Presenter, TabTarget};

/// Profile used when neither --profile nor --temp is given
pub const DEFAULT_PROFILE: &str = "default";

/// Where Chrome opens when no --url is given
pub const DEFAULT_START_URL: &str = "https://www.youtube.com/";

pub struct ChromeOptions {
    pub chrome_path: Option<PathBuf>,
    pub url: Option<String>,
    pub profile: Option<String>,
    pub temp: bool,
    pub port: u16,
}

/// Launch Chrome, wait for the user to reach the page, then scan the active tab
pub fn execute(options: ChromeOptions, args: &SessionArgs, format: OutputFormat) -> Result<()> {
    println!("🔍 Locating Chrome...");
    let chrome_binary = ChromeFinder::new(options.chrome_path).find()?;
    println!("✅ Found Chrome at: {}", chrome_binary.display());

    let profile_manager = select_profile(options.profile.as_deref(), options.temp)?;

    let start_url = options
        .url
        .unwrap_or_else(|| DEFAULT_START_URL.to_string());
    let launcher = ChromeLauncher::new(
        chrome_binary,
        profile_manager.path().to_path_buf(),
        Some(start_url.clone()),
    )
    .with_debugging_port(options.port);

    println!("🚀 Launching Chrome...");
    let mut chrome_process = launcher.launch()?;
    println!("📍 Starting at: {}", start_url);
    println!();
    println!("Open the page to scan in the active tab, then press Enter here...");

    let result = wait_for_enter().and_then(|()| scan_active_tab(launcher.debugging_port(), args, format));

    close_chrome(&mut chrome_process);
    drop(profile_manager);

    result
}

fn select_profile(profile: Option<&str>, temp: bool) -> Result<ProfileManager> {
    if temp {
        if profile.is_some() {
            println!("⚠️  --temp given, ignoring --profile");
        }
        println!("📁 Using temporary profile");
        return Ok(ProfileManager::temporary()?);
    }

    let manager = ProfileManager::named(profile.unwrap_or(DEFAULT_PROFILE))?;
    println!("📁 Using profile: {}", manager.path().display());
    Ok(manager)
}

fn wait_for_enter() -> Result<()> {
    Term::stdout().read_line()?;
    Ok(())
}

fn scan_active_tab(port: u16, args: &SessionArgs, format: OutputFormat) -> Result<()> {
    let mut presenter = Presenter::with_delay(args.delay());

    let runtime = super::runtime()?;
    let host = ChromeEndpoint::new(port);
    let acquired = runtime.block_on(session::acquire(&mut presenter, &host, &TabTarget::Active));
    runtime.shutdown_timeout(std::time::Duration::from_millis(100));
    acquired?;

    session::run(&mut presenter, args, format)
}

fn close_chrome(chrome_process: &mut Child) {
    tracing::debug!("Closing Chrome (pid {})", chrome_process.id());
    if let Err(e) = chrome_process.kill() {
        tracing::debug!("Chrome already exited: {}", e);
    }
    let _ = chrome_process.wait();
}
