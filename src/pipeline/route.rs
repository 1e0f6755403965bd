//! Pick the to-PDF strategy for a source file from its extension.

use crate::config::UnknownFormatPolicy;
use crate::error::{Doc2PagesError, Result};
use std::path::Path;

/// Extensions handled by the ebook converter.
pub const EBOOK_EXTENSIONS: &[&str] = &["epub", "mobi", "azw", "azw3", "azw4", "chm"];

/// Extensions explicitly routed to the office suite.
pub const OFFICE_EXTENSIONS: &[&str] = &[
    "umd", "txt", "doc", "docx", "rtf", "wps", "odt", "xls", "xlsx", "et", "ods", "ppt", "pptx",
    "dps", "odp", "pps", "ppsx", "pot", "potx",
];

/// How a source document becomes a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfRoute {
    /// `ebook-convert <src> <ws>/dst.pdf …`
    Ebook,
    /// `soffice --headless --convert-to pdf …`
    OfficeSuite,
    /// Already a PDF: copy it into the workspace.
    Identity,
}

/// Lowercased extension without the dot; empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Choose the route for `src`.
///
/// Unknown extensions go to the office suite under
/// [`UnknownFormatPolicy::OfficeSuite`] and are rejected under
/// [`UnknownFormatPolicy::Reject`].
pub fn route_for(src: &Path, policy: UnknownFormatPolicy) -> Result<PdfRoute> {
    let ext = extension_of(src);
    let ext = ext.as_str();

    if ext == "pdf" {
        return Ok(PdfRoute::Identity);
    }
    if EBOOK_EXTENSIONS.contains(&ext) {
        return Ok(PdfRoute::Ebook);
    }
    if OFFICE_EXTENSIONS.contains(&ext) {
        return Ok(PdfRoute::OfficeSuite);
    }

    match policy {
        UnknownFormatPolicy::OfficeSuite => Ok(PdfRoute::OfficeSuite),
        UnknownFormatPolicy::Reject => Err(Doc2PagesError::UnsupportedFormat {
            path: src.to_path_buf(),
            extension: ext.to_string(),
        }),
    }
}
