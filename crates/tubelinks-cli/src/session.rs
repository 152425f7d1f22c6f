//! The terminal stand-in for the extension popup.
//!
//! A session acquires links once (behind a spinner), then either runs the
//! interactive checkbox table or applies the selection flags and exports.

use crate::OutputFormat;
use crate::downloader::FileDownloader;
use anyhow::{Result, anyhow};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tubelinks_core::table::{DEFAULT_CELL_WIDTH, RowView, TableView};
use tubelinks_core::{Downloader, Presenter, TabScripting, TabTarget};

/// Options shared by every command that opens a session
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Milliseconds to wait before scanning, so lazily rendered titles can load
    #[arg(long, env = "TUBELINKS_DELAY_MS", default_value_t = 1000)]
    pub delay_ms: u64,

    /// Directory CSV exports are saved to (defaults to the Downloads folder)
    #[arg(short, long, env = "TUBELINKS_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Check every row before exporting
    #[arg(long)]
    pub select_all: bool,

    /// Rows to check before exporting (1-based, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub rows: Vec<usize>,

    /// Export once with the given selection instead of opening the table
    #[arg(long)]
    pub no_interactive: bool,

    /// Save without asking where
    #[arg(short, long)]
    pub yes: bool,

    /// List the links without exporting (implies --no-interactive)
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum characters shown per cell
    #[arg(long, default_value_t = DEFAULT_CELL_WIDTH)]
    pub width: usize,
}

impl SessionArgs {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn interactive(&self) -> bool {
        !self.no_interactive && !self.dry_run
    }

    /// The downloader exports are handed to
    pub fn downloader(&self) -> Result<FileDownloader> {
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => FileDownloader::default_dir()?,
        };
        Ok(FileDownloader::new(dir).with_prompt(!self.yes && self.interactive()))
    }
}

/// One line typed at the table prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCommand {
    /// Flip the checkbox of a 1-based row
    Toggle(usize),
    /// Show the full text and URL of a 1-based row
    Info(usize),
    SelectAll,
    Export,
    Help,
    Quit,
}

impl TableCommand {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Ok(number) = input.parse::<usize>() {
            return Some(TableCommand::Toggle(number));
        }

        let mut parts = input.split_whitespace();
        let command = parts.next()?.to_lowercase();
        let argument = parts.next();
        if parts.next().is_some() {
            return None;
        }

        match (command.as_str(), argument) {
            ("a" | "all", None) => Some(TableCommand::SelectAll),
            ("e" | "export", None) => Some(TableCommand::Export),
            ("q" | "quit", None) => Some(TableCommand::Quit),
            ("?" | "h" | "help", None) => Some(TableCommand::Help),
            ("i" | "info", Some(number)) => number.parse().ok().map(TableCommand::Info),
            ("t" | "toggle", Some(number)) => number.parse().ok().map(TableCommand::Toggle),
            _ => None,
        }
    }
}

/// Acquire links from the host, showing a spinner while waiting
///
/// On failure the spinner's text is replaced by the error message.
pub async fn acquire(
    presenter: &mut Presenter,
    host: &dyn TabScripting,
    target: &TabTarget,
) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("正在获取链接...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    match presenter.acquire(host, target).await {
        Ok(()) => {
            spinner.finish_and_clear();
            Ok(())
        }
        Err(err) => {
            let message = presenter
                .error_message()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            spinner.abandon_with_message(style(&message).red().to_string());
            Err(anyhow!(message))
        }
    }
}

/// Run the post-acquisition part of a session
pub fn run(presenter: &mut Presenter, args: &SessionArgs, format: OutputFormat) -> Result<()> {
    apply_selection_flags(presenter, args)?;

    if args.dry_run {
        let view = presenter.table(args.width)?;
        println!("{}", render_table(&view, format)?);
        return Ok(());
    }

    let downloader = args.downloader()?;
    if args.interactive() {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        run_interactive(
            presenter,
            &downloader,
            &mut stdin.lock(),
            &mut stdout.lock(),
            args.width,
            format,
        )
    } else {
        run_batch(presenter, &downloader, args.width, format)
    }
}

/// Apply `--select-all` and `--rows`
pub fn apply_selection_flags(presenter: &mut Presenter, args: &SessionArgs) -> Result<()> {
    if args.select_all {
        presenter.set_select_all(true)?;
    }
    for &number in &args.rows {
        let index = row_index(number)?;
        let selection = presenter
            .selection()
            .ok_or_else(|| anyhow!("no links loaded"))?;
        if !selection.is_checked(index)? {
            presenter.toggle(index)?;
        }
    }
    Ok(())
}

/// Print the table, then export once
pub fn run_batch(
    presenter: &mut Presenter,
    downloader: &dyn Downloader,
    width: usize,
    format: OutputFormat,
) -> Result<()> {
    let view = presenter.table(width)?;
    println!("{}", render_table(&view, format)?);

    if !presenter.export_enabled() {
        return Err(anyhow!("Export disabled: no rows selected"));
    }

    if let Some(receipt) = presenter.export(downloader, chrono::Utc::now())? {
        eprintln!("✅ CSV saved to: {}", receipt.path.display());
    }
    Ok(())
}

/// Read table commands until the user quits or input ends
pub fn run_interactive<R: BufRead, W: Write>(
    presenter: &mut Presenter,
    downloader: &dyn Downloader,
    input: &mut R,
    output: &mut W,
    width: usize,
    format: OutputFormat,
) -> Result<()> {
    writeln!(output, "{}", render_table(&presenter.table(width)?, format)?)?;
    writeln!(output, "{}", help_text())?;

    let mut line = String::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let Some(command) = TableCommand::parse(&line) else {
            writeln!(output, "Unknown command '{}'. Type ? for help.", line.trim())?;
            continue;
        };

        match command {
            TableCommand::Quit => break,
            TableCommand::Help => writeln!(output, "{}", help_text())?,
            TableCommand::Info(number) => {
                let view = presenter.table(width)?;
                match view.rows().get(number.wrapping_sub(1)) {
                    Some(row) => {
                        writeln!(output, "标题: {}", row.text.title)?;
                        writeln!(output, "链接: {}", row.url.title)?;
                    }
                    None => writeln!(output, "No row {}", number)?,
                }
            }
            TableCommand::Toggle(number) => {
                match row_index(number).and_then(|index| Ok(presenter.toggle(index)?)) {
                    Ok(_) => writeln!(output, "{}", render_table(&presenter.table(width)?, format)?)?,
                    Err(err) => writeln!(output, "{}", err)?,
                }
            }
            TableCommand::SelectAll => {
                presenter.toggle_select_all()?;
                writeln!(output, "{}", render_table(&presenter.table(width)?, format)?)?;
            }
            TableCommand::Export => {
                if !presenter.export_enabled() {
                    writeln!(output, "Export disabled: no rows selected")?;
                    continue;
                }
                match presenter.export(downloader, chrono::Utc::now()) {
                    Ok(Some(receipt)) => {
                        writeln!(output, "✅ CSV saved to: {}", receipt.path.display())?
                    }
                    Ok(None) => writeln!(output, "Export disabled: no rows selected")?,
                    Err(err) => writeln!(output, "❌ {}", err)?,
                }
            }
        }
    }

    Ok(())
}

/// Render the table in the requested format
pub fn render_table(view: &TableView, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
        OutputFormat::Table => Ok(render_tsv(view)),
        OutputFormat::Pretty => Ok(render_pretty(view)),
    }
}

fn render_pretty(view: &TableView) -> String {
    let (rows, select_all, export_enabled) = match view {
        TableView::Placeholder { message } => return style(message).dim().to_string(),
        TableView::Rows {
            rows,
            select_all,
            export_enabled,
        } => (rows, *select_all, *export_enabled),
    };

    let mut out = String::new();
    out.push_str(&format!(
        "{} 全选    {} rows\n",
        checkbox(select_all),
        rows.len()
    ));
    for row in rows {
        out.push_str(&pretty_row(row));
        out.push('\n');
    }

    let export = if export_enabled {
        style("[e] 导出CSV").green().bold()
    } else {
        style("[e] 导出CSV").dim()
    };
    out.push_str(&export.to_string());
    out
}

fn pretty_row(row: &RowView) -> String {
    let number = format!("{:>3}", row.number);
    let text = if row.checked {
        style(&row.text.display).bold()
    } else {
        style(&row.text.display)
    };
    format!(
        "{} {}  {}  {}",
        checkbox(row.checked),
        style(number).dim(),
        text,
        style(&row.url.display).cyan()
    )
}

fn checkbox(checked: bool) -> String {
    if checked {
        style("[x]").green().to_string()
    } else {
        "[ ]".to_string()
    }
}

fn render_tsv(view: &TableView) -> String {
    match view {
        TableView::Placeholder { message } => message.clone(),
        TableView::Rows { rows, .. } => rows
            .iter()
            .map(|row| {
                format!(
                    "{}\t{}\t{}\t{}",
                    row.number,
                    if row.checked { "x" } else { " " },
                    row.text.title,
                    row.url.title
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn help_text() -> &'static str {
    "Commands: <n> toggle row, a select all, i <n> show full row, e export CSV, ? help, q quit"
}

fn row_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Rows are numbered from 1"))
}
