//! Configuration types for document conversion.
//!
//! All converter behaviour is controlled through [`ConverterConfig`], built
//! via its [`ConverterConfigBuilder`]. The external tools are configuration
//! too: every binary is looked up through [`ToolPaths`], so sandboxed or
//! containerised deployments can point at absolute paths instead of relying
//! on `PATH`.

use crate::error::Doc2PagesError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default root under which per-document workspaces are created.
pub const DEFAULT_CACHE_ROOT: &str = "cache/convert";

/// Default timeout for a single external tool invocation (one hour).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Configuration for a [`crate::Converter`].
///
/// Built via [`ConverterConfig::builder()`] or using
/// [`ConverterConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2pages::ConverterConfig;
/// use std::time::Duration;
///
/// let config = ConverterConfig::builder()
///     .cache_root("/var/cache/doc2pages")
///     .timeout(Duration::from_secs(600))
///     .mutool("/opt/mupdf/bin/mutool")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConverterConfig {
    /// Directory under which `<YYYY>/<MM>/<DD>/<uuid>` workspaces are created.
    /// Default: `cache/convert` (relative to the working directory).
    pub cache_root: PathBuf,

    /// Timeout applied to every external tool invocation. Default: one hour.
    ///
    /// A timed-out process is killed and surfaces as
    /// [`Doc2PagesError::ToolTimeout`].
    pub timeout: Duration,

    /// Multiplier applied to [`Self::timeout`] for the batch SVG minifier.
    /// Default: 10.
    ///
    /// svgo processes a whole workspace folder in one call, so it gets a much
    /// longer budget than the per-document tools.
    pub svgo_timeout_factor: u32,

    /// Binaries for each external tool.
    pub tools: ToolPaths,

    /// Full path of a pdfium shared library used by the page counter's second
    /// strategy. `None` binds to the system library.
    pub pdfium_library: Option<PathBuf>,

    /// What to do with source extensions the router does not recognise.
    pub unknown_format: UnknownFormatPolicy,

    /// Optional per-page progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            cache_root: PathBuf::from(DEFAULT_CACHE_ROOT),
            timeout: DEFAULT_TIMEOUT,
            svgo_timeout_factor: 10,
            tools: ToolPaths::default(),
            pdfium_library: None,
            unknown_format: UnknownFormatPolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("cache_root", &self.cache_root)
            .field("timeout", &self.timeout)
            .field("svgo_timeout_factor", &self.svgo_timeout_factor)
            .field("tools", &self.tools)
            .field("pdfium_library", &self.pdfium_library)
            .field("unknown_format", &self.unknown_format)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Timeout used for the svgo batch call.
    pub fn svgo_timeout(&self) -> Duration {
        self.timeout.saturating_mul(self.svgo_timeout_factor)
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.cache_root = root.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout = Duration::from_secs(secs);
        self
    }

    pub fn svgo_timeout_factor(mut self, factor: u32) -> Self {
        self.config.svgo_timeout_factor = factor;
        self
    }

    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.config.tools = tools;
        self
    }

    pub fn soffice(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.soffice = path.into();
        self
    }

    pub fn ebook_convert(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.ebook_convert = path.into();
        self
    }

    pub fn mutool(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.mutool = path.into();
        self
    }

    pub fn inkscape(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.inkscape = path.into();
        self
    }

    pub fn imagemagick(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.imagemagick = path.into();
        self
    }

    pub fn svgo(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.svgo = path.into();
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn unknown_format(mut self, policy: UnknownFormatPolicy) -> Self {
        self.config.unknown_format = policy;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, Doc2PagesError> {
        let c = &self.config;
        if c.timeout.is_zero() {
            return Err(Doc2PagesError::InvalidConfig(
                "Timeout must be greater than zero".into(),
            ));
        }
        if c.svgo_timeout_factor == 0 {
            return Err(Doc2PagesError::InvalidConfig(
                "svgo timeout factor must be ≥ 1".into(),
            ));
        }
        if c.cache_root.as_os_str().is_empty() {
            return Err(Doc2PagesError::InvalidConfig(
                "Cache root must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Tools ────────────────────────────────────────────────────────────────

/// Paths (or bare names resolved on `PATH`) of the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    /// Office suite run headless for office → PDF. Default: `soffice`.
    pub soffice: PathBuf,
    /// Calibre's ebook converter. Default: `ebook-convert`.
    pub ebook_convert: PathBuf,
    /// MuPDF command-line tool: page rendering, text, page count. Default: `mutool`.
    pub mutool: PathBuf,
    /// Fallback PDF page renderer. Default: `inkscape`.
    pub inkscape: PathBuf,
    /// ImageMagick's `convert`. Default: `convert`.
    pub imagemagick: PathBuf,
    /// SVG minifier. Default: `svgo`.
    pub svgo: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            soffice: PathBuf::from("soffice"),
            ebook_convert: PathBuf::from("ebook-convert"),
            mutool: PathBuf::from("mutool"),
            inkscape: PathBuf::from("inkscape"),
            imagemagick: PathBuf::from("convert"),
            svgo: PathBuf::from("svgo"),
        }
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How the router treats a source extension it has no explicit rule for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnknownFormatPolicy {
    /// Hand the file to the office suite and let it decide. (default)
    #[default]
    OfficeSuite,
    /// Fail with [`Doc2PagesError::UnsupportedFormat`].
    Reject,
}

/// Output format of generated pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    Png,
    /// Rasterised to PNG first, then converted page by page.
    Jpg,
    /// Rasterised to PNG first, then converted page by page.
    Webp,
    /// Vector output. (default)
    #[default]
    Svg,
}

impl PageFormat {
    /// Parse an extension such as `"png"`, `".JPG"` or `"svg"`.
    ///
    /// Anything unrecognised maps to [`PageFormat::Svg`], the vector path.
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => PageFormat::Png,
            "jpg" => PageFormat::Jpg,
            "webp" => PageFormat::Webp,
            _ => PageFormat::Svg,
        }
    }

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            PageFormat::Png => "png",
            PageFormat::Jpg => "jpg",
            PageFormat::Webp => "webp",
            PageFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Options for [`crate::Converter::convert_pdf_to_pages`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOptions {
    /// Output format. Default: SVG.
    pub format: PageFormat,
    /// Run svgo over the output folder (SVG only).
    pub enable_svgo: bool,
    /// Replace each SVG page with a gzip-compressed `.gzip.svg` (SVG only).
    pub enable_gzip: bool,
}

impl PageOptions {
    pub fn new(format: PageFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn svgo(mut self, v: bool) -> Self {
        self.enable_svgo = v;
        self
    }

    pub fn gzip(mut self, v: bool) -> Self {
        self.enable_gzip = v;
        self
    }
}
