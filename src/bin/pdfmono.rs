//! CLI binary for pdfmono.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, drives a terminal progress bar from the batch
//! callback, and prints or writes the history report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfmono::{
    BatchController, BatchProgressCallback, ColorMode, ConversionConfig, ExportFormat, JobResult,
    JobStatus, OverwritePolicy,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar per file, per-job log lines, and an
/// interactive overwrite prompt for `--overwrite ask`.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Whether `ask` should really prompt; batch mode without a TTY answers
    /// "no" to stay safe.
    interactive: bool,
}

impl CliProgressCallback {
    fn new(interactive: bool) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar, interactive })
    }

    fn status_mark(status: JobStatus) -> String {
        match status {
            JobStatus::Success => green("✓"),
            JobStatus::PartialFailure => cyan("⚠"),
            JobStatus::Failed => red("✗"),
            JobStatus::Skipped => dim("→"),
        }
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, files_total: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {files_total} file(s)…"))
        ));
    }

    fn on_job_start(
        &self,
        files_completed: usize,
        files_total: usize,
        pages_total: usize,
        file_name: &str,
    ) {
        self.bar.set_length(pages_total as u64);
        self.bar.set_position(0);
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:40.green/238}] {pos:>3}/{len} pages  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        self.bar
            .set_prefix(format!("File {}/{}", files_completed + 1, files_total));
        self.bar.set_message(file_name.to_string());
    }

    fn on_page_complete(
        &self,
        _files_completed: usize,
        _files_total: usize,
        pages_completed: usize,
        _pages_total: usize,
        _file_name: &str,
    ) {
        self.bar.set_position(pages_completed as u64);
    }

    fn on_page_error(&self, page_num: usize, pages_total: usize, error: &str) {
        let msg = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            pages_total,
            red(&msg)
        ));
    }

    fn on_job_complete(&self, _files_completed: usize, _files_total: usize, result: &JobResult) {
        let name = result
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| result.source.display().to_string());
        let detail = match result.status {
            JobStatus::Success | JobStatus::PartialFailure => format!(
                "{}/{} pages  {}  {}",
                result.pages_ok(),
                result.pages.len(),
                dim(&format!("{:.1}s", result.elapsed_ms as f64 / 1000.0)),
                dim(&format!("{} KiB", result.output_bytes / 1024)),
            ),
            _ => result.reason.clone().unwrap_or_default(),
        };
        self.bar.println(format!(
            "{} {:<40} {detail}",
            Self::status_mark(result.status),
            name
        ));
    }

    fn on_batch_complete(&self, files_total: usize, success_count: usize) {
        self.bar.finish_and_clear();
        if success_count == files_total {
            eprintln!(
                "{} {} file(s) converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} file(s) converted",
                cyan("⚠"),
                bold(&success_count.to_string()),
                files_total
            );
        }
    }

    fn confirm_overwrite(&self, path: &Path) -> bool {
        if !self.interactive {
            return false;
        }
        self.bar.suspend(|| {
            eprint!("Output '{}' exists. Overwrite? [y/N] ", path.display());
            io::stderr().flush().ok();
            let mut line = String::new();
            if io::stdin().lock().read_line(&mut line).is_err() {
                return false;
            }
            matches!(line.trim(), "y" | "Y" | "yes")
        })
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one scan to black-and-white, 300 DPI, next to the input
  pdfmono scan.pdf

  # Whole folder to grayscale at 150 DPI into ./out
  pdfmono --mode gray --quality 85 --dpi 150 --output-dir out *.pdf

  # Only pages 1-5 and 8, overwrite existing outputs
  pdfmono --pages 1-5,8 --overwrite overwrite report.pdf

  # Timestamped outputs plus a CSV report of the batch
  pdfmono --timestamp --history csv --history-out batch.csv *.pdf

THRESHOLD:
  Black-and-white mode maps pixels with luma below --threshold to black and
  the rest to white. Lower values lighten the output; 180 suits most scans.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Directory containing a pdfium shared library; the current
                    directory and the system library path are tried otherwise.
"#;

/// Convert PDF files to black-and-white or grayscale image PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "pdfmono",
    version,
    about = "Convert PDF files to black-and-white or grayscale image PDFs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF files, processed in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Colour mode: bw (bi-level) or gray (grayscale JPEG).
    #[arg(long, env = "PDFMONO_MODE", value_enum, default_value = "bw")]
    mode: ModeArg,

    /// Black/white threshold (0-255); pixels below it become black.
    #[arg(long, env = "PDFMONO_THRESHOLD", default_value_t = 180)]
    threshold: u8,

    /// JPEG quality for grayscale mode (1-100).
    #[arg(long, env = "PDFMONO_QUALITY", default_value_t = 95,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Rendering DPI.
    #[arg(long, env = "PDFMONO_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,

    /// Page selection: all, 5, 3-15, or 1,3,5-7.
    #[arg(long, env = "PDFMONO_PAGES", default_value = "all")]
    pages: String,

    /// Suffix appended to each output file stem.
    #[arg(long, env = "PDFMONO_SUFFIX", default_value = "_SW")]
    suffix: String,

    /// Append a timestamp to each output file name.
    #[arg(long, env = "PDFMONO_TIMESTAMP")]
    timestamp: bool,

    /// Directory for output files (default: next to each input).
    #[arg(short, long, env = "PDFMONO_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Behaviour when an output file exists: ask, overwrite, skip.
    #[arg(long, env = "PDFMONO_OVERWRITE", value_enum, default_value = "ask")]
    overwrite: OverwriteArg,

    /// History report format: text, csv, json.
    #[arg(long, env = "PDFMONO_HISTORY", value_enum, default_value = "text")]
    history: HistoryArg,

    /// Write the history report to this file instead of stdout.
    #[arg(long, env = "PDFMONO_HISTORY_OUT")]
    history_out: Option<PathBuf>,

    /// Disable the progress bar.
    #[arg(long, env = "PDFMONO_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFMONO_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the history report.
    #[arg(short, long, env = "PDFMONO_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Bw,
    Gray,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OverwriteArg {
    Ask,
    Overwrite,
    Skip,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum HistoryArg {
    Text,
    Csv,
    Json,
}

impl From<ModeArg> for ColorMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Bw => ColorMode::BlackWhite,
            ModeArg::Gray => ColorMode::Grayscale,
        }
    }
}

impl From<OverwriteArg> for OverwritePolicy {
    fn from(v: OverwriteArg) -> Self {
        match v {
            OverwriteArg::Ask => OverwritePolicy::Ask,
            OverwriteArg::Overwrite => OverwritePolicy::Overwrite,
            OverwriteArg::Skip => OverwritePolicy::Skip,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active; the
    // bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ConversionConfig::builder()
        .mode(cli.mode.into())
        .threshold(cli.threshold)
        .jpeg_quality(cli.quality)
        .dpi(cli.dpi)
        .page_range(cli.pages.clone())
        .output_suffix(cli.suffix.clone())
        .add_timestamp(cli.timestamp)
        .overwrite(cli.overwrite.into());
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run batch ────────────────────────────────────────────────────────
    let mut controller = BatchController::new(config);
    if show_progress {
        let cb = CliProgressCallback::new(true);
        controller = controller.with_progress(cb as Arc<dyn BatchProgressCallback>);
    }

    let history = controller
        .run(cli.inputs.clone())
        .await
        .context("Batch failed")?;

    // ── History report ───────────────────────────────────────────────────
    let report = match cli.history {
        HistoryArg::Text => history.export(ExportFormat::Text),
        HistoryArg::Csv => history.export(ExportFormat::Csv),
        HistoryArg::Json => {
            serde_json::to_string_pretty(&history).context("Failed to serialise history")? + "\n"
        }
    };
    match cli.history_out {
        Some(ref path) => {
            std::fs::write(path, &report)
                .with_context(|| format!("Failed to write history to {}", path.display()))?;
            if !cli.quiet {
                eprintln!("History written to {}", path.display());
            }
        }
        None if cli.quiet || !show_progress => print!("{report}"),
        // With the progress bar active the per-job lines already cover the
        // report; print it only when explicitly redirected or non-text.
        None if !matches!(cli.history, HistoryArg::Text) => print!("{report}"),
        None => {}
    }

    // Non-zero exit when nothing was produced at all.
    let produced = history.count(JobStatus::Success) + history.count(JobStatus::PartialFailure);
    if produced == 0 && !history.is_empty() {
        anyhow::bail!("all {} job(s) failed or were skipped", history.len());
    }
    Ok(())
}
