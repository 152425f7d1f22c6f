use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tubelinks_browser::DEFAULT_DEBUGGING_PORT;
use tubelinks_cli::OutputFormat;
use tubelinks_cli::commands;
use tubelinks_cli::session::SessionArgs;

#[derive(Parser)]
#[command(name = "tubelinks")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Collect YouTube video links from a browser tab and export them as CSV",
    long_about = "tubelinks reads the active Chrome tab, keeps the links to YouTube watch pages, \
                  lets you pick rows in a checkbox table, and saves the picked rows as a CSV file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format for the link table
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch Chrome, then collect links from the active tab
    Chrome {
        /// Page to open when Chrome starts
        #[arg(long)]
        url: Option<String>,

        /// Path to the Chrome binary
        #[arg(long, env = "TUBELINKS_CHROME_PATH")]
        chrome_path: Option<PathBuf>,

        /// Named profile kept under ~/.tubelinks/profiles (keeps your YouTube login)
        #[arg(long)]
        profile: Option<String>,

        /// Use a temporary profile deleted on exit
        #[arg(long)]
        temp: bool,

        /// Remote debugging port for the launched Chrome
        #[arg(long, env = "TUBELINKS_PORT", default_value_t = DEFAULT_DEBUGGING_PORT)]
        port: u16,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Collect links from a Chrome already running with --remote-debugging-port
    Connect {
        /// Remote debugging port of the running Chrome
        #[arg(long, env = "TUBELINKS_PORT", default_value_t = DEFAULT_DEBUGGING_PORT)]
        port: u16,

        /// Scan the first tab whose address contains this text instead of the active tab
        #[arg(long)]
        tab: Option<String>,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Collect links from a saved HTML page
    Scan {
        /// Path to the saved page
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Address the page was saved from (used for relative links and the page row)
        #[arg(long)]
        page_url: String,

        /// Page title (defaults to the document's <title>)
        #[arg(long)]
        page_title: Option<String>,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:\n  \
        bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n  \
        bash:  tubelinks completion --shell bash >> ~/.bashrc\n  \
        zsh:   tubelinks completion --shell zsh > ~/.zfunc/_tubelinks\n  \
        fish:  tubelinks completion --shell fish > ~/.config/fish/completions/tubelinks.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    tracing::debug!("Table format: {}", cli.format.as_str());

    match cli.command {
        Commands::Chrome {
            url,
            chrome_path,
            profile,
            temp,
            port,
            session,
        } => commands::chrome::execute(
            commands::chrome::ChromeOptions {
                chrome_path,
                url,
                profile,
                temp,
                port,
            },
            &session,
            cli.format,
        ),
        Commands::Connect { port, tab, session } => {
            commands::connect::execute(port, tab, &session, cli.format)
        }
        Commands::Scan {
            file,
            page_url,
            page_title,
            session,
        } => commands::scan::execute(&file, page_url, page_title, &session, cli.format),
        Commands::Completion { shell } => {
            commands::completion::execute(shell, &mut Cli::command())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("tubelinks=debug,tubelinks_cli=debug,tubelinks_core=debug,tubelinks_browser=debug")
    } else {
        EnvFilter::new("tubelinks=info,tubelinks_cli=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
