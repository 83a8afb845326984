//! Reading resource text from disk.

use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use crate::base::ResourceUri;
use crate::{Error, Result};

/// Supplies the source text of resources that are not in a set yet.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, uri: &ResourceUri) -> Result<String>;
}

impl<F> ResourceLoader for F
where
    F: Fn(&ResourceUri) -> Result<String> + Send + Sync,
{
    fn load(&self, uri: &ResourceUri) -> Result<String> {
        self(uri)
    }
}

/// Loads resources from files below a root directory. A resource URI is
/// the file's path relative to the root, with `/` separators.
#[derive(Clone, Debug)]
pub struct FileSystemLoader {
    root: PathBuf,
}

impl FileSystemLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, uri: &ResourceUri) -> PathBuf {
        self.root.join(uri.as_str())
    }

    /// The URI of a file below the root, or `None` if it lies elsewhere.
    pub fn uri_of(&self, path: &Path) -> Option<ResourceUri> {
        relative_uri(&self.root, path)
    }
}

impl ResourceLoader for FileSystemLoader {
    fn load(&self, uri: &ResourceUri) -> Result<String> {
        let path = self.path_of(uri);
        trace!("reading '{}'", path.display());
        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ResourceNotFound(uri.clone()),
            _ => Error::Io(e),
        })
    }
}

/// The path of `path` relative to `root` as a resource URI.
pub fn relative_uri(root: &Path, path: &Path) -> Option<ResourceUri> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some(ResourceUri::new(segments.join("/")))
}

/// All files below `dir`, sorted by path.
pub fn collect_file_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(io::Error::other(e)))?;
        if entry.file_type().is_file() {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}
