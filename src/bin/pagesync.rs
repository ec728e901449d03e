//! CLI binary for pagesync.
//!
//! A thin shim over the library crate that maps CLI flags to `SyncConfig`,
//! drives the `Controller`, and prints the resulting screen.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pagesync::{
    convert_image, render, AppState, ConflictPolicy, Controller, Message, SelectedInput,
    SyncClient, SyncConfig,
};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const SHELL_HELP: &str = r#"  select <path>   choose the image to convert
  convert         convert the selection, save it, upload it
  refresh         reload the document list
  download <id>   fetch a document into the downloads folder
  cancel          abort in-flight requests
  help            show this list
  quit            leave the shell
"#;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert an image, save it to the desktop and upload it
  pagesync convert ~/Pictures/photo.jpg

  # Convert only, no upload
  pagesync convert --no-upload scan.PNG

  # List documents on the server
  pagesync list
  pagesync list --json

  # Download document 12 into the downloads folder
  pagesync download 12

  # Interactive single-screen mode
  pagesync shell

SHELL COMMANDS:
  select <path>   choose the image to convert
  convert         convert the selection, save it, upload it
  refresh         reload the document list
  download <id>   fetch a document into the downloads folder
  cancel          abort in-flight requests
  help            show this list
  quit            leave the shell

ENVIRONMENT VARIABLES:
  PAGESYNC_SERVER        Document server base URL (default http://localhost:8080)
  PAGESYNC_OUTPUT_DIR    Where converted PDFs go (default: desktop)
  PAGESYNC_DOWNLOAD_DIR  Where downloads go (default: downloads folder)
  PAGESYNC_TIMEOUT       Per-request timeout in seconds
  PAGESYNC_ON_CONFLICT   overwrite | rename
  RUST_LOG               Overrides --verbose / --quiet log filtering
"#;

/// Convert JPG/PNG images to single-page PDFs and sync them with a document server.
#[derive(Parser, Debug)]
#[command(
    name = "pagesync",
    version,
    about = "Convert JPG/PNG images to single-page PDFs and sync them with a document server",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,

    /// Document server base URL.
    #[arg(long, global = true, env = "PAGESYNC_SERVER", default_value = pagesync::config::DEFAULT_BASE_URL)]
    server: String,

    /// Directory converted PDFs are written to.
    #[arg(long, global = true, env = "PAGESYNC_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Directory downloaded PDFs are written to.
    #[arg(long, global = true, env = "PAGESYNC_DOWNLOAD_DIR")]
    download_dir: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, env = "PAGESYNC_TIMEOUT", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// What to do when the output file already exists.
    #[arg(long, global = true, env = "PAGESYNC_ON_CONFLICT", value_enum, default_value = "overwrite")]
    on_conflict: ConflictArg,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PAGESYNC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PAGESYNC_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Convert an image to PDF, save it, and upload it.
    Convert {
        /// JPG or PNG file.
        image: PathBuf,

        /// Save the PDF locally without uploading it.
        #[arg(long)]
        no_upload: bool,
    },
    /// List the documents stored on the server.
    List {
        /// Print the list as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Download a document by id into the downloads folder.
    Download {
        /// Server-assigned document id.
        id: i64,
    },
    /// Interactive single-screen mode.
    Shell,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ConflictArg {
    Overwrite,
    Rename,
}

impl From<ConflictArg> for ConflictPolicy {
    fn from(v: ConflictArg) -> Self {
        match v {
            ConflictArg::Overwrite => ConflictPolicy::Overwrite,
            ConflictArg::Rename => ConflictPolicy::Rename,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already says what is happening, so INFO logs are muted
    // while it is shown.
    let show_spinner = !cli.quiet && !matches!(cli.command, CliCommand::Shell);
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_spinner {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    match cli.command {
        CliCommand::Convert { image, no_upload } => {
            run_convert(image, no_upload, config, show_spinner).await
        }
        CliCommand::List { json } => run_list(config, json).await,
        CliCommand::Download { id } => run_download(id, config, show_spinner).await,
        CliCommand::Shell => run_shell(config).await,
    }
}

/// Map CLI args to `SyncConfig`.
fn build_config(cli: &Cli) -> Result<SyncConfig> {
    let mut builder = SyncConfig::builder()
        .base_url(cli.server.clone())
        .request_timeout_secs(cli.timeout)
        .conflict_policy(cli.on_conflict.clone().into());

    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(ref dir) = cli.download_dir {
        builder = builder.download_dir(dir);
    }

    builder.build().context("Invalid configuration")
}

fn spinner(enabled: bool, prefix: &'static str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix(prefix);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

async fn run_convert(
    image: PathBuf,
    no_upload: bool,
    config: SyncConfig,
    show_spinner: bool,
) -> Result<()> {
    let bar = spinner(show_spinner, "Converting");

    if no_upload {
        bar.set_message(image.display().to_string());
        let result = convert_image(&SelectedInput::new(&image), &config).await;
        bar.finish_and_clear();
        let doc = result.context("Conversion failed")?;
        if show_spinner {
            eprintln!(
                "{}  {}×{} pt  →  {}",
                green("✔"),
                doc.width,
                doc.height,
                bold(&doc.path.display().to_string())
            );
        }
        return Ok(());
    }

    let mut controller = Controller::new(config).context("Invalid configuration")?;
    controller.dispatch(Message::Select(image));
    controller.dispatch(Message::ConvertRequested);
    bar.set_message(controller.state().status().text.clone());

    while controller.next().await {
        bar.set_message(controller.state().status().text.clone());
    }
    bar.finish_and_clear();

    match convert_outcome(controller.state()) {
        ConvertOutcome::Failed(reason) => anyhow::bail!("{}", reason),
        ConvertOutcome::Done(summary) => {
            if show_spinner {
                eprintln!("{} {}", green("✔"), summary);
                print!("{}", render(controller.state()));
            }
        }
        ConvertOutcome::UploadedWithWarning { path, warning } => {
            if show_spinner {
                eprintln!("{} Uploaded {}", green("✔"), bold(&path.display().to_string()));
            }
            eprintln!("{} {}", dim("warning:"), warning);
        }
    }
    Ok(())
}

/// How a finished `convert` run is reported.
#[derive(Debug, PartialEq, Eq)]
enum ConvertOutcome {
    Done(String),
    /// The document reached the server but a later step (the list refresh) failed.
    UploadedWithWarning { path: PathBuf, warning: String },
    Failed(String),
}

fn convert_outcome(state: &AppState) -> ConvertOutcome {
    let status = state.status();
    match (status.is_error(), state.last_uploaded()) {
        (false, _) => ConvertOutcome::Done(status.text.clone()),
        (true, Some(path)) => ConvertOutcome::UploadedWithWarning {
            path: path.clone(),
            warning: status.text.clone(),
        },
        (true, None) => ConvertOutcome::Failed(status.text.clone()),
    }
}

async fn run_list(config: SyncConfig, json: bool) -> Result<()> {
    let client = SyncClient::new(&config).context("Invalid configuration")?;
    let records = client
        .list()
        .await
        .context("Failed to fetch document list")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("Failed to serialise list")?
        );
    } else if records.is_empty() {
        eprintln!("{}", dim("(no documents on server)"));
    } else {
        for r in &records {
            println!("{:>5}  {}", r.id, r.filename);
        }
    }
    Ok(())
}

async fn run_download(id: i64, config: SyncConfig, show_spinner: bool) -> Result<()> {
    let bar = spinner(show_spinner, "Downloading");
    bar.set_message(format!("document {id}"));

    let client = SyncClient::new(&config).context("Invalid configuration")?;
    let result = client
        .download(id, &config.download_dir, config.conflict_policy)
        .await;
    bar.finish_and_clear();

    let path = result.with_context(|| format!("Failed to download document {id}"))?;
    if show_spinner {
        eprintln!("{} PDF downloaded to: {}", green("✔"), bold(&path.display().to_string()));
    }
    Ok(())
}

/// Interactive mode: one screen, redrawn after every action and completion.
async fn run_shell(config: SyncConfig) -> Result<()> {
    let mut controller = Controller::new(config).context("Invalid configuration")?;
    controller.dispatch(Message::Appeared);
    print!("{}", render(controller.state()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else { break };
                match parse_shell_line(&line) {
                    ShellInput::Message(msg) => controller.dispatch(msg),
                    ShellInput::Cancel => controller.cancel_all().await,
                    ShellInput::Help => {
                        eprint!("{SHELL_HELP}");
                        continue;
                    }
                    ShellInput::Quit => break,
                    ShellInput::Empty => continue,
                    ShellInput::Invalid(reason) => {
                        eprintln!("{} {}", red("✗"), reason);
                        continue;
                    }
                }
                print!("{}", render(controller.state()));
            }
            progressed = controller.next(), if controller.in_flight() > 0 => {
                if progressed {
                    print!("{}", render(controller.state()));
                }
            }
        }
    }

    controller.cancel_all().await;
    Ok(())
}

#[derive(Debug)]
enum ShellInput {
    Message(Message),
    Cancel,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

fn parse_shell_line(line: &str) -> ShellInput {
    let line = line.trim();
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((c, a)) => (c, a.trim()),
        None => (line, ""),
    };

    match cmd.to_lowercase().as_str() {
        "" => ShellInput::Empty,
        "select" | "browse" if !arg.is_empty() => {
            ShellInput::Message(Message::Select(PathBuf::from(arg)))
        }
        "select" | "browse" => ShellInput::Invalid("usage: select <path>".into()),
        "convert" => ShellInput::Message(Message::ConvertRequested),
        "refresh" | "list" => ShellInput::Message(Message::RefreshRequested),
        "download" => match arg.parse::<i64>() {
            Ok(id) => ShellInput::Message(Message::DownloadRequested(id)),
            Err(_) => ShellInput::Invalid(format!("usage: download <id> (got '{arg}')")),
        },
        "cancel" => ShellInput::Cancel,
        "help" | "?" => ShellInput::Help,
        "quit" | "exit" | "q" => ShellInput::Quit,
        other => ShellInput::Invalid(format!("unknown command '{other}', try 'help'")),
    }
}
