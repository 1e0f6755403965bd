//! PDF → per-page PNG or SVG files.
//!
//! ## Two tools, three attempts
//!
//! mutool renders the whole range in a single call, writing
//! `<ws>/1.<ext>`, `<ws>/2.<ext>`, … from an output template. If that call
//! fails, the range is redone with inkscape one page at a time. Inkscape
//! releases disagree on the page-selection flag (`--pdf-page` vs `--pages`),
//! so each page tries `--pdf-page` first and `--pages` second.
//!
//! ## Truncation
//!
//! Output files are numbered by their position in the requested range
//! (1-based), not by absolute page number. After a successful run the files
//! are checked in order and the batch ends at the first missing one; that is
//! not treated as an error. Files left at those paths by an earlier run in
//! the same workspace are removed before each tool call.

use super::exec::ToolCommand;
use crate::config::ConverterConfig;
use crate::error::{Doc2PagesError, Result};
use crate::output::{Page, PageBatch};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Formats the renderers can write directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Png,
    Svg,
}

impl RenderTarget {
    pub fn extension(self) -> &'static str {
        match self {
            RenderTarget::Png => "png",
            RenderTarget::Svg => "svg",
        }
    }
}

/// Path of the `index`-th (1-based) output file of a run.
pub fn page_file(workspace: &Path, index: usize, target: RenderTarget) -> PathBuf {
    workspace.join(format!("{}.{}", index, target.extension()))
}

/// Remove `path` if a previous run left it behind.
async fn remove_stale(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Doc2PagesError::io(path, e)),
    }
}

/// Render pages `from..=to` (1-based, inclusive) of `src` into `workspace`.
///
/// Never returns `Err`: the error that stopped generation, if any, travels in
/// [`PageBatch::error`] next to the pages that were produced.
pub async fn render_pages(
    config: &ConverterConfig,
    workspace: &Path,
    src: &Path,
    from: usize,
    to: usize,
    target: RenderTarget,
) -> PageBatch {
    if from == 0 || to < from {
        return PageBatch::failed(Doc2PagesError::InvalidPageRange { from, to });
    }

    match render_with_mutool(config, workspace, src, from, to, target).await {
        Ok(pages) => {
            info!("mutool rendered {} of {} pages", pages.len(), to - from + 1);
            PageBatch { pages, error: None }
        }
        Err(e) => {
            warn!("mutool failed ({}), retrying pages {}-{} with inkscape", e, from, to);
            let batch = render_with_inkscape(config, workspace, src, from, to, target).await;
            if let Some(ref err) = batch.error {
                error!(
                    "inkscape stopped after {} pages: {}",
                    batch.pages.len(),
                    err
                );
            }
            batch
        }
    }
}

/// `mutool convert -o <ws>/%d.<ext> <src> <from>-<to>`
async fn render_with_mutool(
    config: &ConverterConfig,
    workspace: &Path,
    src: &Path,
    from: usize,
    to: usize,
    target: RenderTarget,
) -> Result<Vec<Page>> {
    for index in 1..=(to - from + 1) {
        remove_stale(&page_file(workspace, index, target)).await?;
    }
    let template = workspace.join(format!("%d.{}", target.extension()));

    ToolCommand::new(&config.tools.mutool, config.timeout)
        .args(["convert", "-o"])
        .arg(&template)
        .arg(src)
        .arg(format!("{from}-{to}"))
        .run("convert pdf to page")
        .await?;

    let mut pages = Vec::with_capacity(to - from + 1);
    for offset in 0..=(to - from) {
        let path = page_file(workspace, offset + 1, target);
        if !path.is_file() {
            debug!("mutool did not produce {}, stopping", path.display());
            break;
        }
        pages.push(Page {
            page_num: from + offset,
            path,
        });
    }
    Ok(pages)
}

async fn render_with_inkscape(
    config: &ConverterConfig,
    workspace: &Path,
    src: &Path,
    from: usize,
    to: usize,
    target: RenderTarget,
) -> PageBatch {
    let mut pages = Vec::with_capacity(to - from + 1);

    for offset in 0..=(to - from) {
        let page_num = from + offset;
        let path = page_file(workspace, offset + 1, target);
        if let Err(e) = remove_stale(&path).await {
            return PageBatch {
                pages,
                error: Some(e),
            };
        }

        if let Err(e) = inkscape_page(config, src, &path, "--pdf-page", page_num).await {
            debug!("inkscape --pdf-page failed for page {} ({}), trying --pages", page_num, e);
            if let Err(e) = inkscape_page(config, src, &path, "--pages", page_num).await {
                return PageBatch {
                    pages,
                    error: Some(e),
                };
            }
        }

        if !path.is_file() {
            debug!("inkscape did not produce {}, stopping", path.display());
            break;
        }
        pages.push(Page { page_num, path });
    }

    PageBatch { pages, error: None }
}

/// `inkscape -o <dst> <page_flag> <n> --pdf-poppler <src>`
async fn inkscape_page(
    config: &ConverterConfig,
    src: &Path,
    dst: &Path,
    page_flag: &str,
    page_num: usize,
) -> Result<String> {
    ToolCommand::new(&config.tools.inkscape, config.timeout)
        .arg("-o")
        .arg(dst)
        .arg(page_flag)
        .arg(page_num.to_string())
        .arg("--pdf-poppler")
        .arg(src)
        .run("convert pdf to page by inkscape")
        .await
}
