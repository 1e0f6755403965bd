//! Post-processing of generated pages.
//!
//! Raster pages can be re-encoded with ImageMagick (PNG → JPG / WEBP).
//! Vector pages can be minified with svgo (one call per folder) and then
//! gzip-compressed one file at a time.
//!
//! These helpers only produce the new file. Swapping the page path and
//! deleting the original is the caller's job, since failures here are
//! best-effort and leave the original page in place.

use super::exec::ToolCommand;
use crate::config::ConverterConfig;
use crate::error::{Doc2PagesError, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Suffix that replaces the extension of a gzip-compressed SVG page.
pub const GZIP_SVG_SUFFIX: &str = ".gzip.svg";

/// Literal rewrites applied before compression. Text layers exported by
/// mutool can contain a bare `<` or `>` in `data-text`, which breaks XML
/// parsers downstream.
const DATA_TEXT_ESCAPES: [(&[u8], &[u8]); 2] = [
    (b"data-text=\"<\"", b"data-text=\"&lt;\""),
    (b"data-text=\">\"", b"data-text=\"&gt;\""),
];

/// `convert <src.png> <src.jpg>`
pub async fn png_to_jpg(config: &ConverterConfig, src: &Path) -> Result<PathBuf> {
    reencode(config, src, "jpg", "convert png to jpg").await
}

/// `convert <src.png> <src.webp>`
pub async fn png_to_webp(config: &ConverterConfig, src: &Path) -> Result<PathBuf> {
    reencode(config, src, "webp", "convert png to webp").await
}

async fn reencode(config: &ConverterConfig, src: &Path, ext: &str, action: &str) -> Result<PathBuf> {
    let dst = src.with_extension(ext);
    ToolCommand::new(&config.tools.imagemagick, config.timeout)
        .arg(src)
        .arg(&dst)
        .run(action)
        .await?;
    Ok(dst)
}

/// `convert <src> <extra…> <dst>`: any ImageMagick conversion, driven by
/// the destination extension.
pub async fn convert_image<S: AsRef<OsStr>>(
    config: &ConverterConfig,
    src: &Path,
    dst: &Path,
    extra_args: &[S],
) -> Result<()> {
    ToolCommand::new(&config.tools.imagemagick, config.timeout)
        .arg(src)
        .args(extra_args)
        .arg(dst)
        .run("convert by imagemagick")
        .await
        .map(|_| ())
}

/// `inkscape -o <dst> <extra…> <src>`, e.g. to rasterise an SVG page.
pub async fn convert_with_inkscape<S: AsRef<OsStr>>(
    config: &ConverterConfig,
    src: &Path,
    dst: &Path,
    extra_args: &[S],
) -> Result<()> {
    ToolCommand::new(&config.tools.inkscape, config.timeout)
        .arg("-o")
        .arg(dst)
        .args(extra_args)
        .arg(src)
        .run("convert by inkscape")
        .await
        .map(|_| ())
}

/// `svgo -f <folder>`, with the longer svgo timeout.
pub async fn svgo_folder(config: &ConverterConfig, folder: &Path) -> Result<()> {
    let out = ToolCommand::new(&config.tools.svgo, config.svgo_timeout())
        .arg("-f")
        .arg(folder)
        .run("compress svg by svgo")
        .await?;
    info!("svgo output: {}", out.trim());
    Ok(())
}

/// Where [`gzip_svg`] writes: `1.svg` → `1.gzip.svg`.
pub fn gzip_svg_path(src: &Path) -> PathBuf {
    let stem = src.file_stem().unwrap_or_default();
    let mut name = stem.to_os_string();
    name.push(GZIP_SVG_SUFFIX);
    src.with_file_name(name)
}

/// Gzip an SVG file at maximum compression after escaping `data-text`
/// attributes. Returns the path of the new file; the source is left alone.
pub async fn gzip_svg(src: &Path) -> Result<PathBuf> {
    let dst = gzip_svg_path(src);
    let raw = tokio::fs::read(src).await.map_err(|e| {
        error!("Failed to read svg {}: {}", src.display(), e);
        Doc2PagesError::io(src, e)
    })?;

    let escaped = escape_data_text(&raw);
    let compressed = gzip_best(&escaped).map_err(|e| Doc2PagesError::io(src, e))?;
    debug!(
        "Compressed {} from {} to {} bytes",
        src.display(),
        raw.len(),
        compressed.len()
    );

    tokio::fs::write(&dst, &compressed).await.map_err(|e| {
        error!("Failed to write {}: {}", dst.display(), e);
        Doc2PagesError::io(&dst, e)
    })?;
    Ok(dst)
}

/// Apply the `data-text` escapes to raw SVG bytes.
pub fn escape_data_text(input: &[u8]) -> Vec<u8> {
    DATA_TEXT_ESCAPES
        .iter()
        .fold(input.to_vec(), |acc, (from, to)| replace_all(&acc, from, to))
}

fn gzip_best(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 4), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = rest.windows(needle.len()).position(|w| w == needle) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(replacement);
        rest = &rest[pos + needle.len()..];
    }
    out.extend_from_slice(rest);
    out
}
