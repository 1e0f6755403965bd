//! # doc2pages
//!
//! Turn office documents, ebooks and PDFs into one image file per page by
//! orchestrating the usual command-line tools.
//!
//! ## Why orchestrate?
//!
//! Good converters for every input family already exist: LibreOffice for
//! office files, Calibre for ebooks, MuPDF and Inkscape for PDF pages,
//! ImageMagick for raster formats, svgo for SVG size. What callers lack is
//! one entry point that picks the right tool, applies a timeout, retries
//! with a fallback, and keeps each document's scratch files in a directory
//! that can be wiped in one call. That is what this crate provides.
//!
//! ## Pipeline Overview
//!
//! ```text
//! source
//!  │
//!  ├─ 1. Route    extension → office suite / ebook converter / copy
//!  ├─ 2. To PDF   <workspace>/<stem>.pdf or <workspace>/dst.pdf
//!  ├─ 3. Count    mutool show → pdfium → byte scan
//!  ├─ 4. Render   mutool convert, per-page inkscape fallback
//!  └─ 5. Polish   png → jpg/webp, svgo, gzip
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2pages::{Converter, ConverterConfig, PageFormat, PageOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut converter = Converter::new(ConverterConfig::default());
//!     let options = PageOptions::new(PageFormat::Svg).gzip(true);
//!     let output = converter
//!         .convert_document("book.epub".as_ref(), 1, None, &options)
//!         .await?;
//!     for page in &output.pages.pages {
//!         println!("{} → {}", page.page_num, page.path.display());
//!     }
//!     if let Some(err) = &output.pages.error {
//!         eprintln!("stopped early: {err}");
//!     }
//!     converter.clean()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2pages` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! doc2pages = { version = "0.1", default-features = false }
//! ```
//!
//! ## External tools
//!
//! | Role | Default binary |
//! |------|----------------|
//! | office suite | `soffice` |
//! | ebook converter | `ebook-convert` |
//! | PDF toolkit | `mutool` |
//! | vector fallback | `inkscape` |
//! | raster conversion | `convert` |
//! | SVG minifier | `svgo` |
//!
//! Every binary can be overridden through [`ToolPaths`]. Use
//! [`Converter::check_tools`] to see which ones resolve.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConverterConfig, ConverterConfigBuilder, PageFormat, PageOptions, ToolPaths,
    UnknownFormatPolicy,
};
pub use convert::Converter;
pub use error::{Doc2PagesError, Result};
pub use output::{DocumentOutput, Page, PageBatch};
pub use pipeline::probe::{ToolKind, ToolStatus};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use workspace::Workspace;
