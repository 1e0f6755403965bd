//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConverterConfigBuilder::progress_callback`] to receive
//! events as [`crate::Converter::convert_pdf_to_pages`] produces pages.
//!
//! # Example
//!
//! ```rust
//! use doc2pages::{ConversionProgressCallback, ConverterConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, path: &Path) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} → {}", page_num, total_pages, path.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConverterConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the converter as it produces pages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `Send + Sync` so one callback can be shared by
/// several converters running on different threads.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any page is produced.
    ///
    /// # Arguments
    /// * `total_pages`: number of pages requested
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called for every page that ended up on disk.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number in the source PDF
    /// * `total_pages`: number of pages requested
    /// * `path`: final file for the page (after post-processing)
    fn on_page_complete(&self, page_num: usize, total_pages: usize, path: &Path) {
        let _ = (page_num, total_pages, path);
    }

    /// Called for the page at which generation stopped.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after all pages have been attempted.
    ///
    /// # Arguments
    /// * `total_pages`: number of pages requested
    /// * `success_count`: pages actually produced
    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConverterConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
