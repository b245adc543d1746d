//! Document root: path resolution, classification and file access.
//!
//! All request paths are resolved against a single canonical directory.
//! Resolution is lexical first (so `..` can never climb out, even towards
//! paths that do not exist). Existing paths are canonicalised again to catch
//! symlinks pointing elsewhere, and a missing path is checked through its
//! deepest existing ancestor.

use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, bail};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

/// Subdirectories every document root is expected to carry.
pub const REQUIRED_DIRS: [&str; 2] = ["put", "post"];

/// Index files tried, in order, when a GET names a directory.
pub const INDEX_FILES: [&str; 2] = ["index.htm", "index.html"];

/// Accessibility of a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    NotExist,
    Forbidden,
    Directory,
    File,
}

#[derive(Debug, Clone)]
pub struct DocumentRoot {
    root: PathBuf,
}

impl DocumentRoot {
    /// Prepares `path` for serving: creates it and the required
    /// subdirectories when absent, then canonicalises it.
    pub async fn bootstrap(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        match fs::metadata(path).await {
            Ok(meta) if !meta.is_dir() => bail!(
                "a file named '{}' exists where the document root directory should be",
                path.display()
            ),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(path)
                    .await
                    .with_context(|| format!("creating document root {}", path.display()))?;
                info!(root = %path.display(), "Created document root");
            }
            Err(e) => {
                return Err(e).with_context(|| format!("accessing document root {}", path.display()));
            }
        }

        for dir in REQUIRED_DIRS {
            let sub = path.join(dir);
            if fs::metadata(&sub).await.is_err() {
                fs::create_dir_all(&sub)
                    .await
                    .with_context(|| format!("creating {}", sub.display()))?;
            }
        }

        let root = fs::canonicalize(path)
            .await
            .with_context(|| format!("resolving document root {}", path.display()))?;

        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Joins a request target onto the root without touching the disk.
    ///
    /// Returns `None` when `..` segments would climb above the root.
    pub fn resolve(&self, target: &str) -> Option<PathBuf> {
        let mut segments: Vec<&str> = Vec::new();

        for segment in target.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop()?;
                }
                other => segments.push(other),
            }
        }

        let mut path = self.root.clone();
        for segment in segments {
            // A segment must stay a single normal component once joined.
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(_)), None) => path.push(segment),
                _ => return None,
            }
        }
        Some(path)
    }

    /// Classifies an already-resolved path. Does not follow index files.
    pub async fn classify(&self, path: &Path) -> PathKind {
        if !path.starts_with(&self.root) {
            return PathKind::Forbidden;
        }

        let meta = match fs::metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return self.classify_missing(path).await,
            // Existence can't be determined, e.g. a parent without search permission.
            Err(_) => return PathKind::Forbidden,
        };

        match fs::canonicalize(path).await {
            Ok(real) if real.starts_with(&self.root) => {}
            _ => return PathKind::Forbidden,
        }

        if meta.is_dir() {
            PathKind::Directory
        } else if fs::File::open(path).await.is_err() {
            PathKind::Forbidden
        } else {
            PathKind::File
        }
    }

    /// A missing path is only writable when creating it stays inside the
    /// root: the leaf must not be a dangling symlink and the deepest existing
    /// ancestor must canonicalise below the root.
    async fn classify_missing(&self, path: &Path) -> PathKind {
        match fs::symlink_metadata(path).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            _ => return PathKind::Forbidden,
        }

        for ancestor in path.ancestors().skip(1) {
            match fs::canonicalize(ancestor).await {
                Ok(real) if real.starts_with(&self.root) => return PathKind::NotExist,
                Ok(_) => return PathKind::Forbidden,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(_) => return PathKind::Forbidden,
            }
        }
        PathKind::Forbidden
    }

    /// Whether `path` lies strictly below the root's `dir` subdirectory.
    pub fn is_below(&self, dir: &str, path: &Path) -> bool {
        let base = self.root.join(dir);
        path.starts_with(&base) && path != base
    }

    /// Returns the first index file present in `dir`, if any.
    pub async fn index_file(&self, dir: &Path) -> Option<PathBuf> {
        for name in INDEX_FILES {
            let candidate = dir.join(name);
            if fs::try_exists(&candidate).await.unwrap_or(false) {
                return Some(candidate);
            }
        }
        None
    }

    pub async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path).await
    }

    /// Creates or truncates `path` with `data`.
    pub async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        fs::write(path, data).await
    }

    /// Appends `data` to an existing file.
    pub async fn append(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = fs::OpenOptions::new().append(true).open(path).await?;
        file.write_all(data).await?;
        file.flush().await
    }

    /// A sibling of `path` whose file name carries a random unique token.
    pub fn unique_sibling(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!("copy-{}-{}", Uuid::new_v4(), name))
    }
}
