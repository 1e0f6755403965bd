//! Result types produced by the converter.

use crate::error::{Doc2PagesError, Result};
use serde::Serialize;
use std::path::PathBuf;

/// One generated page file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-indexed page number in the source PDF.
    pub page_num: usize,
    /// Absolute or cache-root-relative path of the generated file.
    pub path: PathBuf,
}

/// Pages generated for a requested range, in page order.
///
/// Generation stops at the first page that could not be produced. The pages
/// before it are kept, and `error` holds the reason when a tool failure (as
/// opposed to a silently missing output file) stopped the run.
#[derive(Debug, Default)]
pub struct PageBatch {
    pub pages: Vec<Page>,
    pub error: Option<Doc2PagesError>,
}

impl PageBatch {
    pub(crate) fn failed(error: Doc2PagesError) -> Self {
        Self {
            pages: Vec::new(),
            error: Some(error),
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// True when no error was recorded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Page numbers in order; handy in logs and assertions.
    pub fn page_numbers(&self) -> Vec<usize> {
        self.pages.iter().map(|p| p.page_num).collect()
    }

    /// Treat any recorded error as fatal, discarding partial pages.
    pub fn into_result(self) -> Result<Vec<Page>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.pages),
        }
    }
}

/// Everything [`crate::Converter::convert_document`] produced.
#[derive(Debug)]
pub struct DocumentOutput {
    /// The original input.
    pub source: PathBuf,
    /// Intermediate PDF inside the workspace.
    pub pdf: PathBuf,
    /// Page count of the intermediate PDF.
    pub total_pages: usize,
    /// First page requested.
    pub from_page: usize,
    /// Last page requested, after clamping to `total_pages`.
    pub to_page: usize,
    /// Generated pages.
    pub pages: PageBatch,
}
