//! CLI binary for edgequake-analyst.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalysisConfig`, shows a spinner while the pipeline runs and prints the
//! model's answer.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_analyst::{
    analyze, extract_document, prompt_for, read_document, write_output, AnalysisConfig,
    AnalysisOutcome, AnalysisProgressCallback, DocumentFormat, ProgressCallback, PromptDelivery,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit code when the document held no extractable text.
const EXIT_NO_TEXT: u8 = 2;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one spinner that follows the pipeline phases.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, filename: &str) {
        self.bar.set_prefix("Reading");
        self.bar.set_message(format!("Reading your file… {}", dim(filename)));
    }

    fn on_extraction_complete(&self, chars: usize) {
        if chars == 0 {
            self.bar.finish_and_clear();
            return;
        }
        self.bar.println(format!(
            "  {} Extracted {}",
            green("✓"),
            dim(&format!("{chars} chars"))
        ));
    }

    fn on_invocation_start(&self, prompt_chars: usize) {
        self.bar.set_prefix("Analysing");
        self.bar.set_message(format!(
            "Generating summary and recommendations… {}",
            dim(&format!("({prompt_chars} chars prompt)"))
        ));
    }

    fn on_invocation_complete(&self, success: bool) {
        self.bar.finish_and_clear();
        if success {
            eprintln!("{} {}", green("✔"), bold("Here are your results:"));
        } else {
            eprintln!("{} {}", red("✘"), bold("The model call failed"));
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a PDF report (stdout)
  analyst q3-report.pdf

  # Summarise a spreadsheet, write the answer to a file
  analyst sales.xlsx -o summary.md

  # Use another local model
  analyst --model llama3.1 q3-report.pdf

  # Very large report: send the prompt on stdin instead of argv
  analyst --stdin-prompt annual-report.pdf

  # See what would be sent, without calling the model
  analyst --extract-only q3-report.pdf
  analyst --print-prompt q3-report.pdf

  # JSON output with document info and timings
  analyst --json sales.xlsx > result.json

SUPPORTED FILES:
  PDF          .pdf                      text layer of every page, in order
  Spreadsheet  .xlsx .xlsm .xlsb .xls .ods   first sheet, one line per row

EXIT CODES:
  0  summary produced
  1  error (unsupported format, unreadable file, model failure, …)
  2  no text could be extracted; the model was not called

ENVIRONMENT VARIABLES:
  ANALYST_COMMAND      Model runtime executable (default: ollama)
  ANALYST_MODEL        Model identifier (default: mistral)
  ANALYST_OUTPUT       Default output file
  RUST_LOG             Log filter override (e.g. edgequake_analyst=debug)

SETUP:
  1. Install Ollama:  https://ollama.com/
  2. Pull the model:  ollama pull mistral
  3. Analyse:         analyst report.pdf
"#;

/// Summarise PDF and spreadsheet reports with a local language model.
#[derive(Parser, Debug)]
#[command(
    name = "analyst",
    version,
    about = "Summarise PDF and spreadsheet reports with a local language model",
    long_about = "Extract the text of a commercial report (PDF or spreadsheet), send it to a \
locally running model (Ollama by default) and print a summary with sales-strategy, \
product-portfolio and resource-allocation recommendations.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Report file (.pdf, .xlsx, .xlsm, .xlsb, .xls, .ods).
    input: PathBuf,

    /// Write the result to this file instead of stdout.
    #[arg(short, long, env = "ANALYST_OUTPUT")]
    output: Option<PathBuf>,

    /// Declare the file format instead of inferring it from the extension.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Model runtime executable.
    #[arg(long, env = "ANALYST_COMMAND", default_value = "ollama")]
    command: String,

    /// Sub-command that runs a prompt.
    #[arg(long, env = "ANALYST_SUBCOMMAND", default_value = "run")]
    subcommand: String,

    /// Model identifier (e.g. mistral, llama3.1, phi3).
    #[arg(short, long, env = "ANALYST_MODEL", default_value = "mistral")]
    model: String,

    /// Path to a text file with a custom prompt template containing {report}.
    #[arg(long, env = "ANALYST_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Send the prompt on the model's stdin instead of as an argument.
    #[arg(long, env = "ANALYST_STDIN_PROMPT")]
    stdin_prompt: bool,

    /// Warn when the prompt is longer than this many characters.
    #[arg(long, default_value_t = 32_000)]
    prompt_warn_chars: usize,

    /// Print the extracted text only; do not call the model.
    #[arg(long, conflicts_with = "print_prompt")]
    extract_only: bool,

    /// Print the prompt that would be sent; do not call the model.
    #[arg(long)]
    print_prompt: bool,

    /// Output structured JSON instead of plain text.
    #[arg(long, env = "ANALYST_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "ANALYST_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ANALYST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, env = "ANALYST_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Pdf,
    Spreadsheet,
}

impl From<FormatArg> for DocumentFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Pdf => DocumentFormat::Pdf,
            FormatArg::Spreadsheet => DocumentFormat::Spreadsheet,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the feedback; INFO logs would fight with it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Read the upload ──────────────────────────────────────────────────
    let document = read_document(&cli.input, cli.format.map(Into::into))
        .await
        .context("Failed to read file")?;

    // ── Extract-only / print-prompt modes ────────────────────────────────
    if cli.extract_only || cli.print_prompt {
        let extraction = extract_document(document)
            .await
            .context("Failed to read file")?;

        if extraction.is_empty() {
            warn_no_text();
            return Ok(ExitCode::from(EXIT_NO_TEXT));
        }

        let text = if cli.print_prompt {
            let config = build_config(&cli, None).await?;
            prompt_for(&extraction.text, &config)
        } else if cli.json {
            serde_json::to_string_pretty(&extraction).context("Failed to serialise extraction")?
        } else {
            extraction.text
        };
        emit(&cli, &text).await?;
        return Ok(ExitCode::SUCCESS);
    }

    // ── Build config ─────────────────────────────────────────────────────
    let spinner = show_progress.then(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = spinner
        .clone()
        .map(|cb| cb as Arc<dyn AnalysisProgressCallback>);
    let config = build_config(&cli, progress_cb).await?;

    // ── Run analysis ─────────────────────────────────────────────────────
    let outcome = analyze(document, &config).await;
    if let Some(ref spinner) = spinner {
        spinner.bar.finish_and_clear();
    }
    let outcome = outcome.context("Error generating output")?;

    match outcome {
        AnalysisOutcome::NoTextExtracted(info) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&AnalysisOutcome::NoTextExtracted(info))
                        .context("Failed to serialise output")?
                );
            }
            warn_no_text();
            Ok(ExitCode::from(EXIT_NO_TEXT))
        }
        AnalysisOutcome::Completed(output) => {
            let text = if cli.json {
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?
            } else {
                output.result.clone()
            };
            emit(&cli, &text).await?;

            if !cli.quiet && !cli.json {
                eprintln!(
                    "   {} {}  /  {}ms total",
                    dim(&output.document.extracted_chars.to_string()),
                    dim("chars analysed"),
                    output.stats.total_duration_ms,
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn warn_no_text() {
    eprintln!("{} No text was extracted from the file.", yellow("⚠"));
}

/// Write `text` to `--output` or stdout.
async fn emit(cli: &Cli, text: &str) -> Result<()> {
    if let Some(ref path) = cli.output {
        write_output(path, text)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !cli.quiet {
            eprintln!("{}  →  {}", green("✔"), bold(&path.display().to_string()));
        }
        return Ok(());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    // Ensure a trailing newline on stdout.
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}

/// Map CLI args to `AnalysisConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AnalysisConfig> {
    let delivery = if cli.stdin_prompt {
        PromptDelivery::Stdin
    } else {
        PromptDelivery::Argument
    };

    let mut builder = AnalysisConfig::builder()
        .command(&cli.command)
        .subcommand(&cli.subcommand)
        .model(&cli.model)
        .prompt_delivery(delivery)
        .prompt_warn_chars(cli.prompt_warn_chars);

    if let Some(ref path) = cli.prompt_file {
        let template = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt template from {:?}", path))?;
        builder = builder.prompt_template(template);
    }

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::try_parse_from(["analyst", "report.pdf"]).unwrap();
        assert_eq!(cli.command, "ollama");
        assert_eq!(cli.subcommand, "run");
        assert_eq!(cli.model, "mistral");
        assert!(cli.format.is_none());
        assert!(!cli.stdin_prompt);
    }

    #[test]
    fn cli_rejects_conflicting_modes() {
        assert!(Cli::try_parse_from(["analyst", "--extract-only", "--print-prompt", "a.pdf"]).is_err());
    }

    #[test]
    fn format_arg_maps_to_document_format() {
        let cli = Cli::try_parse_from(["analyst", "--format", "spreadsheet", "export.bin"]).unwrap();
        assert_eq!(cli.format.map(DocumentFormat::from), Some(DocumentFormat::Spreadsheet));
    }
}
