//! CLI binary for doc2pages.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConverterConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use doc2pages::{
    ConversionProgressCallback, Converter, ConverterConfig, DocumentOutput, PageFormat,
    PageOptions, ProgressCallback, ToolStatus, UnknownFormatPolicy,
};
use doc2pages::pipeline::probe::check_all;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while the document is turned into
/// a PDF and counted, then a bar once the page range is known.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// The bar's length is set by `on_conversion_start`.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Converting to PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering {total_pages} pages…"))
        ));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, path: &Path) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&path.display().to_string()),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        // Keep the log line on one terminal row.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
    }

    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let missing = total_pages.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if missing == 0 {
            eprintln!(
                "{} {} pages generated",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages generated  ({} missing)",
                if success_count == 0 {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_pages,
                red(&missing.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every page of a Word document as SVG
  doc2pages report.docx

  # Pages 3-10 of an ebook as JPG
  doc2pages --from 3 --to 10 --format jpg book.epub

  # Minified, gzip-compressed SVG pages
  doc2pages --svgo --gzip slides.pptx

  # Page count only, removing the scratch directory afterwards
  doc2pages --count-only --clean paper.pdf

  # Plain text of a PDF
  doc2pages --text paper.pdf

  # Which external tools are installed?
  doc2pages --check-tools

  # JSON output for scripting
  doc2pages --json --format png book.mobi > pages.json

ROUTING:
  epub mobi azw azw3 azw4 chm        → ebook-convert
  doc docx rtf odt xls xlsx ppt pptx
  umd txt wps et dps pps pot …       → soffice --headless
  pdf                                → copied as-is
  anything else                      → soffice (or rejected with --reject-unknown)

ENVIRONMENT VARIABLES:
  DOC2PAGES_CACHE_DIR     Workspace root (default: cache/convert)
  DOC2PAGES_TIMEOUT       Per-tool timeout in seconds (default: 3600)
  DOC2PAGES_SOFFICE       soffice binary
  DOC2PAGES_EBOOK_CONVERT ebook-convert binary
  DOC2PAGES_MUTOOL        mutool binary
  DOC2PAGES_INKSCAPE      inkscape binary
  DOC2PAGES_CONVERT       ImageMagick convert binary
  DOC2PAGES_SVGO          svgo binary
  DOC2PAGES_PDFIUM_LIB    libpdfium used as the second page-count strategy
  RUST_LOG                Overrides --verbose / --quiet log filtering
"#;

/// Convert documents to one image per page using external tools.
#[derive(Parser, Debug)]
#[command(
    name = "doc2pages",
    version,
    about = "Convert office documents, ebooks and PDFs to per-page PNG/JPG/WEBP/SVG files",
    long_about = "Convert office documents, ebooks and PDFs to one PNG, JPG, WEBP or SVG file \
per page. The work is done by LibreOffice, Calibre, MuPDF, Inkscape, ImageMagick and svgo; \
doc2pages picks the right tool, applies timeouts and falls back when a tool fails.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Source document (office file, ebook, text or PDF).
    #[arg(required_unless_present = "check_tools")]
    input: Option<PathBuf>,

    /// First page to generate (1-based).
    #[arg(long, env = "DOC2PAGES_FROM", default_value_t = 1,
          value_parser = clap::value_parser!(u64).range(1..))]
    from: u64,

    /// Last page to generate. Default: last page of the document.
    #[arg(long, env = "DOC2PAGES_TO")]
    to: Option<usize>,

    /// Page format.
    #[arg(long, env = "DOC2PAGES_FORMAT", value_enum, default_value = "svg")]
    format: FormatArg,

    /// Minify SVG pages with svgo.
    #[arg(long, env = "DOC2PAGES_ENABLE_SVGO")]
    svgo: bool,

    /// Gzip SVG pages into `<n>.gzip.svg`.
    #[arg(long, env = "DOC2PAGES_ENABLE_GZIP")]
    gzip: bool,

    /// Root directory for per-document workspaces.
    #[arg(long, env = "DOC2PAGES_CACHE_DIR", default_value = "cache/convert")]
    cache_dir: PathBuf,

    /// Timeout for each external tool, in seconds.
    #[arg(long, env = "DOC2PAGES_TIMEOUT", default_value_t = 3600)]
    timeout: u64,

    /// soffice binary.
    #[arg(long, env = "DOC2PAGES_SOFFICE")]
    soffice: Option<PathBuf>,

    /// ebook-convert binary.
    #[arg(long, env = "DOC2PAGES_EBOOK_CONVERT")]
    ebook_convert: Option<PathBuf>,

    /// mutool binary.
    #[arg(long, env = "DOC2PAGES_MUTOOL")]
    mutool: Option<PathBuf>,

    /// inkscape binary.
    #[arg(long, env = "DOC2PAGES_INKSCAPE")]
    inkscape: Option<PathBuf>,

    /// ImageMagick convert binary.
    #[arg(long = "convert", env = "DOC2PAGES_CONVERT")]
    imagemagick: Option<PathBuf>,

    /// svgo binary.
    #[arg(long = "svgo-bin", env = "DOC2PAGES_SVGO")]
    svgo_bin: Option<PathBuf>,

    /// pdfium shared library for page counting. Default: system library.
    #[arg(long, env = "DOC2PAGES_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Fail on extensions without an explicit route instead of trying soffice.
    #[arg(long, env = "DOC2PAGES_REJECT_UNKNOWN")]
    reject_unknown: bool,

    /// Report which external tools are available, then exit.
    #[arg(long)]
    check_tools: bool,

    /// Print the page count only.
    #[arg(long, conflicts_with_all = ["pdf_only", "text"])]
    count_only: bool,

    /// Stop after producing the intermediate PDF and print its path.
    #[arg(long, conflicts_with = "text")]
    pdf_only: bool,

    /// Extract plain text from the intermediate PDF and print its path.
    #[arg(long)]
    text: bool,

    /// Remove the workspace when done.
    #[arg(long, env = "DOC2PAGES_CLEAN")]
    clean: bool,

    /// Output structured JSON instead of one path per line.
    #[arg(long, env = "DOC2PAGES_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "DOC2PAGES_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2PAGES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2PAGES_QUIET")]
    quiet: bool,
}

impl Cli {
    fn renders_pages(&self) -> bool {
        !(self.check_tools || self.count_only || self.pdf_only || self.text)
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    Jpg,
    Webp,
    Svg,
}

impl From<FormatArg> for PageFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => PageFormat::Png,
            FormatArg::Jpg => PageFormat::Jpg,
            FormatArg::Webp => PageFormat::Webp,
            FormatArg::Svg => PageFormat::Svg,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO-level library logs are hidden while the progress bar is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && cli.renders_pages();
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

    let progress = show_progress.then(CliProgressCallback::new_dynamic);
    let config = build_config(
        &cli,
        progress
            .clone()
            .map(|cb| cb as Arc<dyn ConversionProgressCallback>),
    )?;

    // ── Tool check mode ──────────────────────────────────────────────────
    if cli.check_tools {
        return report_tools(&cli, &config);
    }

    let input = cli
        .input
        .clone()
        .context("An input document is required")?;
    let mut converter = Converter::new(config);

    let result = run(&cli, &mut converter, &input).await;

    if let Some(ref cb) = progress {
        cb.bar.finish_and_clear();
    }
    if cli.clean {
        if let Err(e) = converter.clean() {
            warn!("Failed to clean workspace: {}", e);
        }
    }

    result
}

async fn run(cli: &Cli, converter: &mut Converter, input: &Path) -> Result<()> {
    // ── PDF-only / text / count modes ────────────────────────────────────
    if cli.pdf_only || cli.text || cli.count_only {
        let pdf = converter
            .convert_to_pdf(input)
            .await
            .with_context(|| format!("Failed to convert {} to PDF", input.display()))?;

        if cli.count_only {
            let pages = converter
                .count_pdf_pages(&pdf)
                .await
                .context("Failed to count pages")?;
            if cli.json {
                println!(
                    "{}",
                    json!({ "source": input, "pdf": pdf, "total_pages": pages })
                );
            } else {
                println!("{pages}");
            }
            return Ok(());
        }

        let out = if cli.text {
            converter
                .convert_pdf_to_text(&pdf)
                .await
                .context("Failed to extract text")?
        } else {
            pdf
        };
        if cli.json {
            println!("{}", json!({ "source": input, "output": out }));
        } else {
            println!("{}", out.display());
        }
        return Ok(());
    }

    // ── Page conversion ──────────────────────────────────────────────────
    let options = PageOptions::new(cli.format.into())
        .svgo(cli.svgo)
        .gzip(cli.gzip);
    let output = converter
        .convert_document(input, cli.from as usize, cli.to, &options)
        .await
        .context("Conversion failed")?;

    print_pages(cli, &output)?;

    match output.pages.error {
        Some(ref e) if output.pages.is_empty() => {
            anyhow::bail!("No pages generated: {e}")
        }
        Some(ref e) => {
            if !cli.quiet && !cli.json {
                eprintln!(
                    "{} stopped after page {}: {}",
                    cyan("⚠"),
                    output.from_page + output.pages.len() - 1,
                    e
                );
            }
        }
        None => {}
    }
    Ok(())
}

fn print_pages(cli: &Cli, output: &DocumentOutput) -> Result<()> {
    if cli.json {
        let value = json!({
            "source": output.source,
            "pdf": output.pdf,
            "total_pages": output.total_pages,
            "from_page": output.from_page,
            "to_page": output.to_page,
            "pages": output.pages.pages,
            "error": output.pages.error.as_ref().map(|e| e.to_string()),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("Failed to serialise output")?
        );
    } else {
        for page in &output.pages.pages {
            println!("{}", page.path.display());
        }
    }
    Ok(())
}

/// Probe every tool without minting a workspace.
fn report_tools(cli: &Cli, config: &ConverterConfig) -> Result<()> {
    let statuses = check_all(&config.tools);
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&statuses).context("Failed to serialise tools")?
        );
    } else {
        print_tool_table(&statuses);
    }
    Ok(())
}

fn print_tool_table(statuses: &[ToolStatus]) {
    for status in statuses {
        let (mark, location) = match status.resolved {
            Some(ref path) => (green("✓"), path.display().to_string()),
            None => (red("✗"), red("not found")),
        };
        println!(
            "{} {:<14} {:<40} {}",
            mark,
            status.configured.display().to_string(),
            location,
            dim(status.kind.role()),
        );
    }
}

/// Map CLI args to `ConverterConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConverterConfig> {
    let mut builder = ConverterConfig::builder()
        .cache_root(&cli.cache_dir)
        .timeout_secs(cli.timeout);

    if cli.reject_unknown {
        builder = builder.unknown_format(UnknownFormatPolicy::Reject);
    }
    if let Some(ref p) = cli.soffice {
        builder = builder.soffice(p);
    }
    if let Some(ref p) = cli.ebook_convert {
        builder = builder.ebook_convert(p);
    }
    if let Some(ref p) = cli.mutool {
        builder = builder.mutool(p);
    }
    if let Some(ref p) = cli.inkscape {
        builder = builder.inkscape(p);
    }
    if let Some(ref p) = cli.imagemagick {
        builder = builder.imagemagick(p);
    }
    if let Some(ref p) = cli.svgo_bin {
        builder = builder.svgo(p);
    }
    if let Some(ref p) = cli.pdfium_lib {
        builder = builder.pdfium_library(p);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
