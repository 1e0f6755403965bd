//! Per-document scratch directory.
//!
//! A workspace lives at `<cache_root>/<YYYY>/<MM>/<DD>/<uuid>`. The path is
//! minted on first use and then stays the same until [`Workspace::clean`]
//! removes the directory tree, after which the next access mints a new one.
//!
//! The state is plain owned data: a [`crate::Converter`] holds exactly one
//! `Workspace` and mutates it through `&mut self`.

use crate::error::{Doc2PagesError, Result};
use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    current: Option<PathBuf>,
}

impl Workspace {
    /// A workspace rooted at `root`. No path is minted yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            current: None,
        }
    }

    /// The cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The current path, minting one if needed. Does not touch the disk.
    pub fn path(&mut self) -> &Path {
        let root = &self.root;
        self.current.get_or_insert_with(|| mint(root))
    }

    /// The current path without minting.
    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// The current path, with the directory created on disk.
    pub fn ensure(&mut self) -> Result<PathBuf> {
        let dir = self.path().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| Doc2PagesError::io(&dir, e))?;
        Ok(dir)
    }

    /// Remove the workspace directory tree and forget the path.
    ///
    /// A directory that was never created (or is already gone) is not an
    /// error. The path is reset even when removal fails.
    pub fn clean(&mut self) -> Result<()> {
        let Some(dir) = self.current.take() else {
            return Ok(());
        };

        info!("Cleaning workspace {}", dir.display());
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => {
                info!("Workspace {} removed", dir.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!("Failed to clean workspace {}: {}", dir.display(), e);
                Err(Doc2PagesError::io(dir, e))
            }
        }
    }
}

/// `<root>/<YYYY>/<MM>/<DD>/<uuid v1>`.
fn mint(root: &Path) -> PathBuf {
    let today = Local::now().date_naive();
    root.join(format!("{:04}", today.year()))
        .join(format!("{:02}", today.month()))
        .join(format!("{:02}", today.day()))
        .join(Uuid::now_v1(node_id()).to_string())
}

/// Random node id shared by every workspace minted in this process.
fn node_id() -> &'static [u8; 6] {
    static NODE: OnceLock<[u8; 6]> = OnceLock::new();
    NODE.get_or_init(|| {
        let random = Uuid::new_v4();
        let mut node = [0u8; 6];
        node.copy_from_slice(&random.as_bytes()[..6]);
        node
    })
}
