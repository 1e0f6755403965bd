//! Tool availability checks.
//!
//! A probe only resolves the configured binary; it never runs it. A bare
//! name (`mutool`) is searched on `PATH`, anything containing a path
//! separator (`/opt/mupdf/bin/mutool`, `./mutool`) is checked as given.

use super::exec::tool_name;
use crate::config::ToolPaths;
use crate::error::{Doc2PagesError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The external tools the converter drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Soffice,
    EbookConvert,
    Mutool,
    Inkscape,
    ImageMagick,
    Svgo,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Soffice,
        ToolKind::EbookConvert,
        ToolKind::Mutool,
        ToolKind::Inkscape,
        ToolKind::ImageMagick,
        ToolKind::Svgo,
    ];

    /// What the tool is used for, for `--check-tools` output.
    pub fn role(self) -> &'static str {
        match self {
            ToolKind::Soffice => "office documents → pdf",
            ToolKind::EbookConvert => "ebooks → pdf",
            ToolKind::Mutool => "pdf → pages, text, page count",
            ToolKind::Inkscape => "pdf → pages (fallback)",
            ToolKind::ImageMagick => "png → jpg/webp",
            ToolKind::Svgo => "svg minification",
        }
    }

    /// The configured binary for this tool.
    pub fn configured(self, tools: &ToolPaths) -> &Path {
        match self {
            ToolKind::Soffice => &tools.soffice,
            ToolKind::EbookConvert => &tools.ebook_convert,
            ToolKind::Mutool => &tools.mutool,
            ToolKind::Inkscape => &tools.inkscape,
            ToolKind::ImageMagick => &tools.imagemagick,
            ToolKind::Svgo => &tools.svgo,
        }
    }
}

/// One row of [`crate::Converter::check_tools`].
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub kind: ToolKind,
    /// Binary as configured.
    pub configured: PathBuf,
    /// Where it resolved to, if it did.
    pub resolved: Option<PathBuf>,
}

impl ToolStatus {
    pub fn is_available(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Probe every tool in `tools`.
pub fn check_all(tools: &ToolPaths) -> Vec<ToolStatus> {
    ToolKind::ALL
        .iter()
        .map(|&kind| {
            let configured = kind.configured(tools).to_path_buf();
            let resolved = locate(&configured).ok();
            ToolStatus {
                kind,
                configured,
                resolved,
            }
        })
        .collect()
}

/// Resolve `program` to an executable file.
pub fn locate(program: &Path) -> Result<PathBuf> {
    let not_found = || Doc2PagesError::ToolNotFound {
        tool: tool_name(program),
        path: program.to_path_buf(),
    };

    if program.as_os_str().is_empty() {
        return Err(not_found());
    }

    if program.components().count() > 1 {
        return if is_executable(program) {
            Ok(program.to_path_buf())
        } else {
            Err(not_found())
        };
    }

    let path_var = std::env::var_os("PATH").ok_or_else(not_found)?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| {
            debug!("probing {}", candidate.display());
            is_executable(candidate)
        })
        .ok_or_else(not_found)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}
