use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::file_loader::{collect_file_paths, relative_uri};
use crate::base::ResourceUri;
use crate::resource::{ParseResult, ResourceSet};
use crate::{Error, Result};

/// What [`WorkspaceLoader::load_directory`] did.
#[derive(Debug, Default)]
pub struct WorkspaceLoadReport {
    /// Resources loaded, in path order. Includes resources loaded with
    /// syntax errors.
    pub loaded: Vec<ResourceUri>,
    /// Files without a registered language.
    pub skipped: Vec<PathBuf>,
    /// Files that could not be read or added.
    pub failed: Vec<(PathBuf, String)>,
}

impl WorkspaceLoadReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Loads workspace files into a resource set.
pub struct WorkspaceLoader;

impl WorkspaceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load every file below `dir` whose extension has a registered
    /// language, in sorted path order. Resource URIs are paths relative to
    /// `dir`. A failing file does not stop the others.
    pub fn load_directory(&self, dir: &Path, set: &mut ResourceSet) -> Result<WorkspaceLoadReport> {
        if !dir.is_dir() {
            return Err(Error::ResourceNotFound(ResourceUri::new(
                dir.display().to_string(),
            )));
        }

        let mut report = WorkspaceLoadReport::default();
        for path in collect_file_paths(dir)? {
            let Some(uri) = relative_uri(dir, &path) else {
                continue;
            };
            if !set.languages().supports(&uri) {
                report.skipped.push(path);
                continue;
            }
            match self.load_file(&path, uri.clone(), set) {
                Ok(_) => report.loaded.push(uri),
                Err(e) => {
                    warn!("failed to load '{}': {}", path.display(), e);
                    report.failed.push((path, e.to_string()));
                }
            }
        }

        debug!(
            "loaded {} resources from '{}' ({} skipped, {} failed)",
            report.loaded.len(),
            dir.display(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Load a single file under the given URI.
    pub fn load_file(&self, path: &Path, uri: ResourceUri, set: &mut ResourceSet) -> Result<ParseResult> {
        let text = std::fs::read_to_string(path)?;
        set.load_resource(uri, &text)
    }
}

impl Default for WorkspaceLoader {
    fn default() -> Self {
        Self::new()
    }
}
