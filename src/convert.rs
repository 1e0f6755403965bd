//! The per-document converter.
//!
//! A [`Converter`] owns a [`ConverterConfig`] and one [`Workspace`]. Every
//! file it writes (the intermediate PDF, page images, text) lands in that
//! workspace, so [`Converter::clean`] removes all of it at once. Use one
//! converter per source document; the workspace-touching methods take
//! `&mut self`, which keeps a single instance from being driven concurrently.
//!
//! Each method awaits one external tool at a time. Nothing is parallelised
//! inside a converter.

use crate::config::{ConverterConfig, PageFormat, PageOptions};
use crate::error::{Doc2PagesError, Result};
use crate::output::{DocumentOutput, PageBatch};
use crate::pipeline::probe::{self, ToolKind, ToolStatus};
use crate::pipeline::render::{self, RenderTarget};
use crate::pipeline::route::{self, PdfRoute};
use crate::pipeline::{count, postprocess, to_pdf};
use crate::workspace::Workspace;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Drives the external tools for one source document.
///
/// # Example
/// ```rust,no_run
/// use doc2pages::{Converter, ConverterConfig, PageFormat, PageOptions};
///
/// # async fn run() -> doc2pages::Result<()> {
/// let mut converter = Converter::new(ConverterConfig::default());
/// let pdf = converter.convert_to_pdf("report.docx".as_ref()).await?;
/// let pages = converter
///     .convert_pdf_to_pages(&pdf, 1, 3, &PageOptions::new(PageFormat::Png))
///     .await;
/// for page in &pages.pages {
///     println!("{} → {}", page.page_num, page.path.display());
/// }
/// converter.clean()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    config: ConverterConfig,
    workspace: Workspace,
}

impl Converter {
    /// Create a converter and its workspace directory.
    ///
    /// Directory creation is best-effort: a failure is logged and retried by
    /// the first operation that needs the workspace.
    pub fn new(config: ConverterConfig) -> Self {
        if let Err(e) = std::fs::create_dir_all(&config.cache_root) {
            warn!(
                "Failed to create cache root {}: {}",
                config.cache_root.display(),
                e
            );
        }

        let mut workspace = Workspace::new(&config.cache_root);
        match workspace.ensure() {
            Ok(dir) => debug!("Workspace ready at {}", dir.display()),
            Err(e) => warn!("Failed to create workspace: {}", e),
        }

        Self { config, workspace }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Current workspace directory (minted on first call, stable until
    /// [`Self::clean`]).
    pub fn workspace(&mut self) -> &Path {
        self.workspace.path()
    }

    /// Remove the workspace and everything in it.
    pub fn clean(&mut self) -> Result<()> {
        self.workspace.clean()
    }

    // ── To PDF ────────────────────────────────────────────────────────────

    /// Convert any supported source to a PDF inside the workspace.
    ///
    /// The strategy is chosen from the file extension; see
    /// [`crate::pipeline::route`].
    pub async fn convert_to_pdf(&mut self, src: &Path) -> Result<PathBuf> {
        match route::route_for(src, self.config.unknown_format)? {
            PdfRoute::Ebook => self.convert_ebook_to_pdf(src).await,
            PdfRoute::OfficeSuite => self.convert_office_to_pdf(src).await,
            PdfRoute::Identity => self.copy_pdf(src).await,
        }
    }

    /// Office documents, `.txt` and `.umd` via the headless office suite.
    pub async fn convert_office_to_pdf(&mut self, src: &Path) -> Result<PathBuf> {
        let ws = self.workspace.ensure()?;
        to_pdf::office_to_pdf(&self.config, &ws, src).await
    }

    /// EPUB, MOBI, AZW*, CHM via the ebook converter.
    pub async fn convert_ebook_to_pdf(&mut self, src: &Path) -> Result<PathBuf> {
        let ws = self.workspace.ensure()?;
        to_pdf::ebook_to_pdf(&self.config, &ws, src).await
    }

    /// Copy a PDF into the workspace as `dst.pdf`.
    pub async fn copy_pdf(&mut self, src: &Path) -> Result<PathBuf> {
        let ws = self.workspace.ensure()?;
        to_pdf::copy_pdf(&ws, src).await
    }

    /// Extract plain text into `<workspace>/dst.txt`.
    pub async fn convert_pdf_to_text(&mut self, src: &Path) -> Result<PathBuf> {
        let ws = self.workspace.ensure()?;
        to_pdf::pdf_to_text(&self.config, &ws, src).await
    }

    // ── PDF to pages ──────────────────────────────────────────────────────

    /// One PNG per page for `from..=to`.
    pub async fn convert_pdf_to_png(&mut self, src: &Path, from: usize, to: usize) -> PageBatch {
        self.render(src, from, to, RenderTarget::Png).await
    }

    /// One SVG per page for `from..=to`, optionally minified and gzipped.
    ///
    /// Post-processing only runs when rendering finished without an error
    /// and produced at least one page. Both steps are best-effort: a failed
    /// svgo run leaves the pages as rendered, and a page that fails to
    /// compress keeps its plain `.svg` path.
    pub async fn convert_pdf_to_svg(
        &mut self,
        src: &Path,
        from: usize,
        to: usize,
        enable_svgo: bool,
        enable_gzip: bool,
    ) -> PageBatch {
        let mut batch = self.render(src, from, to, RenderTarget::Svg).await;
        if batch.error.is_some() || batch.is_empty() {
            return batch;
        }

        if enable_svgo {
            if let Some(folder) = batch.pages[0].path.parent() {
                if let Err(e) = self.compress_svg_by_svgo(folder).await {
                    warn!("svgo failed, keeping unminified pages: {}", e);
                }
            }
        }

        if enable_gzip {
            for page in &mut batch.pages {
                match postprocess::gzip_svg(&page.path).await {
                    Ok(dst) => {
                        if let Err(e) = tokio::fs::remove_file(&page.path).await {
                            warn!("Failed to remove {}: {}", page.path.display(), e);
                        }
                        page.path = dst;
                    }
                    Err(e) => warn!("gzip failed for page {}: {}", page.page_num, e),
                }
            }
        }

        batch
    }

    /// Pages in the format named by `options`, with progress events.
    ///
    /// `png` renders rasters directly. `jpg` and `webp` render PNGs first
    /// and re-encode each one; a page whose re-encode fails keeps its PNG.
    /// Anything else goes through [`Self::convert_pdf_to_svg`].
    pub async fn convert_pdf_to_pages(
        &mut self,
        src: &Path,
        from: usize,
        to: usize,
        options: &PageOptions,
    ) -> PageBatch {
        let start = Instant::now();
        let requested = if from >= 1 && to >= from { to - from + 1 } else { 0 };
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_conversion_start(requested);
        }

        let batch = match options.format {
            PageFormat::Png => self.convert_pdf_to_png(src, from, to).await,
            PageFormat::Jpg | PageFormat::Webp => {
                let mut batch = self.convert_pdf_to_png(src, from, to).await;
                for page in &mut batch.pages {
                    let converted = match options.format {
                        PageFormat::Webp => self.convert_png_to_webp(&page.path).await,
                        _ => self.convert_png_to_jpg(&page.path).await,
                    };
                    match converted {
                        Ok(dst) => {
                            if let Err(e) = tokio::fs::remove_file(&page.path).await {
                                warn!("Failed to remove {}: {}", page.path.display(), e);
                            }
                            page.path = dst;
                        }
                        Err(e) => warn!(
                            "Keeping PNG for page {}, {} conversion failed: {}",
                            page.page_num, options.format, e
                        ),
                    }
                }
                batch
            }
            PageFormat::Svg => {
                self.convert_pdf_to_svg(src, from, to, options.enable_svgo, options.enable_gzip)
                    .await
            }
        };

        info!(
            "Generated {}/{} {} pages in {}ms",
            batch.len(),
            requested,
            options.format,
            start.elapsed().as_millis()
        );

        if let Some(ref cb) = self.config.progress_callback {
            for page in &batch.pages {
                cb.on_page_complete(page.page_num, requested, &page.path);
            }
            if let Some(ref e) = batch.error {
                cb.on_page_error(from + batch.len(), requested, &e.to_string());
            }
            cb.on_conversion_complete(requested, batch.len());
        }

        batch
    }

    async fn render(&mut self, src: &Path, from: usize, to: usize, target: RenderTarget) -> PageBatch {
        let ws = match self.workspace.ensure() {
            Ok(ws) => ws,
            Err(e) => return PageBatch::failed(e),
        };
        render::render_pages(&self.config, &ws, src, from, to, target).await
    }

    // ── Post-processing ───────────────────────────────────────────────────

    /// `convert a.png a.jpg`; returns the JPG path. The PNG is kept.
    pub async fn convert_png_to_jpg(&self, src: &Path) -> Result<PathBuf> {
        postprocess::png_to_jpg(&self.config, src).await
    }

    /// `convert a.png a.webp`; returns the WEBP path. The PNG is kept.
    pub async fn convert_png_to_webp(&self, src: &Path) -> Result<PathBuf> {
        postprocess::png_to_webp(&self.config, src).await
    }

    /// Minify every SVG in `folder` in place.
    pub async fn compress_svg_by_svgo(&self, folder: &Path) -> Result<()> {
        postprocess::svgo_folder(&self.config, folder).await
    }

    /// Write `<stem>.gzip.svg` next to `src`. The source is kept.
    pub async fn compress_svg_by_gzip(&self, src: &Path) -> Result<PathBuf> {
        postprocess::gzip_svg(src).await
    }

    /// Arbitrary ImageMagick conversion: `convert <src> <extra…> <dst>`.
    pub async fn convert_image<S: AsRef<OsStr>>(
        &self,
        src: &Path,
        dst: &Path,
        extra_args: &[S],
    ) -> Result<()> {
        postprocess::convert_image(&self.config, src, dst, extra_args).await
    }

    /// Arbitrary inkscape export: `inkscape -o <dst> <extra…> <src>`.
    pub async fn convert_with_inkscape<S: AsRef<OsStr>>(
        &self,
        src: &Path,
        dst: &Path,
        extra_args: &[S],
    ) -> Result<()> {
        postprocess::convert_with_inkscape(&self.config, src, dst, extra_args).await
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// Page count of a PDF. Tries mutool, then pdfium, then a byte scan.
    pub async fn count_pdf_pages(&self, pdf: &Path) -> Result<usize> {
        count::count_pages(&self.config, pdf).await
    }

    pub fn check_mupdf(&self) -> Result<PathBuf> {
        self.check(ToolKind::Mutool)
    }

    pub fn check_soffice(&self) -> Result<PathBuf> {
        self.check(ToolKind::Soffice)
    }

    pub fn check_calibre(&self) -> Result<PathBuf> {
        self.check(ToolKind::EbookConvert)
    }

    pub fn check_svgo(&self) -> Result<PathBuf> {
        self.check(ToolKind::Svgo)
    }

    pub fn check_inkscape(&self) -> Result<PathBuf> {
        self.check(ToolKind::Inkscape)
    }

    pub fn check_imagemagick(&self) -> Result<PathBuf> {
        self.check(ToolKind::ImageMagick)
    }

    /// Availability of every tool.
    pub fn check_tools(&self) -> Vec<ToolStatus> {
        probe::check_all(&self.config.tools)
    }

    fn check(&self, kind: ToolKind) -> Result<PathBuf> {
        probe::locate(kind.configured(&self.config.tools))
    }

    // ── End to end ────────────────────────────────────────────────────────

    /// Source document → PDF → pages.
    ///
    /// `to` defaults to the last page and is clamped to the page count.
    ///
    /// # Errors
    /// Returns `Err` when no PDF could be produced, the page count is
    /// unknown, or `from` lies outside the document. Failures while
    /// generating pages are reported in [`DocumentOutput::pages`] instead.
    pub async fn convert_document(
        &mut self,
        src: &Path,
        from: usize,
        to: Option<usize>,
        options: &PageOptions,
    ) -> Result<DocumentOutput> {
        info!("Starting conversion: {}", src.display());
        let pdf = self.convert_to_pdf(src).await?;
        let total_pages = self.count_pdf_pages(&pdf).await?;
        info!("PDF has {} pages", total_pages);

        let to_page = to.unwrap_or(total_pages).min(total_pages);
        if from == 0 || from > to_page {
            return Err(Doc2PagesError::InvalidPageRange { from, to: to_page });
        }

        let pages = self.convert_pdf_to_pages(&pdf, from, to_page, options).await;
        Ok(DocumentOutput {
            source: src.to_path_buf(),
            pdf,
            total_pages,
            from_page: from,
            to_page,
            pages,
        })
    }
}
