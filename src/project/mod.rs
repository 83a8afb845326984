pub mod file_loader;
mod initializer;
mod workspace_loader;

pub use file_loader::{FileSystemLoader, ResourceLoader, collect_file_paths};
pub use initializer::{InitializeReport, LanguageSupport, ResourceSetInitializer};
pub use workspace_loader::{WorkspaceLoadReport, WorkspaceLoader};
