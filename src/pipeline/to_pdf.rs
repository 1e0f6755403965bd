//! Leaf converters that turn a source document into a PDF (or a PDF into
//! text) inside the workspace.
//!
//! None of these retry. A tool failure is logged by
//! [`ToolCommand::run`] and returned as-is.

use super::exec::ToolCommand;
use crate::config::ConverterConfig;
use crate::error::{Doc2PagesError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Name of the PDF written by the ebook converter and the identity copy.
pub const DST_PDF: &str = "dst.pdf";

/// Name of the text file written by [`pdf_to_text`].
pub const DST_TXT: &str = "dst.txt";

/// Page margin (points) passed to every side by the ebook converter.
const EBOOK_MARGIN: &str = "36";

/// `soffice --headless --convert-to pdf --outdir <ws> <src>` → `<ws>/<stem>.pdf`.
pub async fn office_to_pdf(config: &ConverterConfig, workspace: &Path, src: &Path) -> Result<PathBuf> {
    let stem = src
        .file_stem()
        .ok_or_else(|| Doc2PagesError::Internal(format!("'{}' has no file name", src.display())))?;
    // soffice keeps inner dots: `a.b.docx` becomes `a.b.pdf`.
    let mut name = stem.to_os_string();
    name.push(".pdf");
    let dst = workspace.join(name);

    ToolCommand::new(&config.tools.soffice, config.timeout)
        .args(["--headless", "--convert-to", "pdf", "--outdir"])
        .arg(workspace)
        .arg(src)
        .run("convert to pdf by soffice")
        .await?;

    expect_output(dst)
}

/// `ebook-convert <src> <ws>/dst.pdf --paper-size a4 --pdf-page-margin-* 36`.
pub async fn ebook_to_pdf(config: &ConverterConfig, workspace: &Path, src: &Path) -> Result<PathBuf> {
    let dst = workspace.join(DST_PDF);
    tokio::fs::create_dir_all(workspace)
        .await
        .map_err(|e| Doc2PagesError::io(workspace, e))?;

    ToolCommand::new(&config.tools.ebook_convert, config.timeout)
        .arg(src)
        .arg(&dst)
        .args(["--paper-size", "a4"])
        .args(["--pdf-page-margin-bottom", EBOOK_MARGIN])
        .args(["--pdf-page-margin-left", EBOOK_MARGIN])
        .args(["--pdf-page-margin-right", EBOOK_MARGIN])
        .args(["--pdf-page-margin-top", EBOOK_MARGIN])
        .run("convert to pdf by calibre")
        .await?;

    expect_output(dst)
}

/// Copy an existing PDF to `<ws>/dst.pdf`.
pub async fn copy_pdf(workspace: &Path, src: &Path) -> Result<PathBuf> {
    let dst = workspace.join(DST_PDF);
    match tokio::fs::copy(src, &dst).await {
        Ok(bytes) => {
            debug!("Copied {} ({} bytes) to {}", src.display(), bytes, dst.display());
            Ok(dst)
        }
        Err(e) => {
            error!("Failed to copy {} to {}: {}", src.display(), dst.display(), e);
            Err(Doc2PagesError::io(src, e))
        }
    }
}

/// `mutool convert -o <ws>/dst.txt <src>`.
pub async fn pdf_to_text(config: &ConverterConfig, workspace: &Path, src: &Path) -> Result<PathBuf> {
    let dst = workspace.join(DST_TXT);

    ToolCommand::new(&config.tools.mutool, config.timeout)
        .args(["convert", "-o"])
        .arg(&dst)
        .arg(src)
        .run("convert pdf to txt")
        .await?;

    expect_output(dst)
}

fn expect_output(dst: PathBuf) -> Result<PathBuf> {
    if dst.is_file() {
        Ok(dst)
    } else {
        error!("Tool succeeded but {} is missing", dst.display());
        Err(Doc2PagesError::MissingOutput { path: dst })
    }
}
