//! PDF page counting with three independent strategies.
//!
//! 1. `mutool show <file> pages`, reading the last `page N = …` line.
//! 2. pdfium, bound at runtime. A missing library is an ordinary error.
//! 3. A raw byte scan: the references inside the last `/Pages` object.
//!
//! The first strategy that yields a positive count wins. If all three fail,
//! the error of the last one is returned.

use super::exec::ToolCommand;
use crate::config::ConverterConfig;
use crate::error::{Doc2PagesError, Result};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Count the pages of `pdf`.
pub async fn count_pages(config: &ConverterConfig, pdf: &Path) -> Result<usize> {
    match count_with_mutool(config, pdf).await {
        Ok(pages) => return Ok(pages),
        Err(e) => warn!("mutool page count failed for {}: {}", pdf.display(), e),
    }

    match count_with_pdfium(pdf, config.pdfium_library.clone()).await {
        Ok(pages) => return Ok(pages),
        Err(e) => debug!("pdfium page count failed for {}: {}", pdf.display(), e),
    }

    count_by_scanning(pdf).await.inspect_err(|e| {
        error!("count pdf pages: {}", e);
    })
}

async fn count_with_mutool(config: &ConverterConfig, pdf: &Path) -> Result<usize> {
    let out = ToolCommand::new(&config.tools.mutool, config.timeout)
        .arg("show")
        .arg(pdf)
        .arg("pages")
        .run("count pdf pages")
        .await?;

    parse_mutool_pages(&out).ok_or_else(|| Doc2PagesError::PdfStructure {
        path: pdf.to_path_buf(),
        step: "mutool output has no parsable \"page N =\" line".into(),
    })
}

/// Page count from `mutool show … pages` output.
///
/// Lines are scanned from the end. A line counts when, trimmed and
/// lowercased, it starts with `page`; the text between that label and the
/// first `=` must parse as a positive integer. Lines that don't parse are
/// skipped.
pub fn parse_mutool_pages(output: &str) -> Option<usize> {
    output.lines().rev().find_map(|line| {
        let line = line.trim().to_ascii_lowercase();
        debug!("count pdf pages: {}", line);
        let rest = line.strip_prefix("page")?;
        let number = rest.split('=').next()?.trim();
        number.parse::<usize>().ok().filter(|&n| n > 0)
    })
}

async fn count_with_pdfium(pdf: &Path, library: Option<PathBuf>) -> Result<usize> {
    let path = pdf.to_path_buf();
    tokio::task::spawn_blocking(move || count_with_pdfium_blocking(&path, library.as_deref()))
        .await
        .map_err(|e| Doc2PagesError::Internal(format!("pdfium task panicked: {}", e)))?
}

/// Blocking implementation of the pdfium strategy.
fn count_with_pdfium_blocking(pdf: &Path, library: Option<&Path>) -> Result<usize> {
    let library_error = |e: PdfiumError| Doc2PagesError::PdfLibrary {
        path: pdf.to_path_buf(),
        detail: format!("{:?}", e),
    };

    let bindings = match library {
        Some(lib) => Pdfium::bind_to_library(lib),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(library_error)?;
    let pdfium = Pdfium::new(bindings);

    let document = pdfium.load_pdf_from_file(pdf, None).map_err(library_error)?;
    let pages = document.pages().len() as usize;
    if pages == 0 {
        return Err(Doc2PagesError::PdfLibrary {
            path: pdf.to_path_buf(),
            detail: "document reports zero pages".into(),
        });
    }
    info!("pdfium counted {} pages in {}", pages, pdf.display());
    Ok(pages)
}

async fn count_by_scanning(pdf: &Path) -> Result<usize> {
    let bytes = tokio::fs::read(pdf)
        .await
        .map_err(|e| Doc2PagesError::io(pdf, e))?;
    scan_page_refs(&bytes).map_err(|step| Doc2PagesError::PdfStructure {
        path: pdf.to_path_buf(),
        step: step.into(),
    })
}

/// Count `0 R` references between the last `/Pages` and the next `endobj`.
///
/// This reads the `/Kids` array of the last page-tree node written to the
/// file, which is right for flat page trees produced by most converters.
pub fn scan_page_refs(bytes: &[u8]) -> std::result::Result<usize, &'static str> {
    let content = String::from_utf8_lossy(bytes);
    let (_, tail) = content
        .rsplit_once("/Pages")
        .ok_or("splitting on \"/Pages\" failed: token not found")?;
    let (object, _) = tail
        .split_once("endobj")
        .ok_or("splitting on \"endobj\" failed: no endobj after the last /Pages")?;

    match object.matches("0 R").count() {
        0 => Err("no \"0 R\" page references inside the /Pages object"),
        n => Ok(n),
    }
}
