//! Workspace loading from disk.

use std::fs;
use std::path::Path;

use loom::ResourceUri;
use loom::project::{FileSystemLoader, ResourceLoader, WorkspaceLoader};
use loom::{Error, Result};
use tempfile::TempDir;

use crate::helpers::set_helpers::*;

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "shapes.types", "type Shape;");
    write(dir.path(), "sub/circle.types", "type Circle extends Shape;");
    write(dir.path(), "sub/broken.types", "type Broken extends;");
    write(dir.path(), "README.md", "# not a model");
    dir
}

#[test]
fn test_load_directory_loads_supported_files_in_path_order() {
    let dir = workspace();
    let mut set = types_set();

    let report = WorkspaceLoader::new().load_directory(dir.path(), &mut set).unwrap();

    let loaded: Vec<&str> = report.loaded.iter().map(ResourceUri::as_str).collect();
    assert_eq!(loaded, ["shapes.types", "sub/broken.types", "sub/circle.types"]);
    assert_eq!(report.skipped, [dir.path().join("README.md")]);
    assert!(report.is_ok());
    assert_eq!(set.len(), 3);

    // Files with syntax errors are loaded anyway.
    let broken = set.resource(&"sub/broken.types".into()).unwrap();
    assert!(broken.errors().count() > 0);
}

#[test]
fn test_loaded_workspace_links_across_directories() {
    let dir = workspace();
    let mut set = types_set();
    WorkspaceLoader::new().load_directory(dir.path(), &mut set).unwrap();

    let outcome = link(&mut set);

    assert_eq!(outcome.bound, 1);
    let circle = set.node(&uri("sub/circle.types#//@elements.0")).unwrap();
    assert_eq!(
        circle.references("extends")[0].target(),
        Some(&uri("shapes.types#//@elements.0"))
    );
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut set = types_set();

    let result = WorkspaceLoader::new().load_directory(&dir.path().join("nope"), &mut set);

    assert!(matches!(result, Err(Error::ResourceNotFound(_))));
}

#[test]
fn test_line_col_of_loaded_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.types", "type A;\ntype B extends Missing;\n");
    let mut set = types_set();
    WorkspaceLoader::new()
        .load_file(&dir.path().join("a.types"), "a.types".into(), &mut set)
        .unwrap();
    link(&mut set);

    let resource = set.resource(&"a.types".into()).unwrap();
    let range = resource.errors().next().and_then(|d| d.range).unwrap();
    let position = resource.line_col(range.start()).unwrap();
    assert_eq!(position.line, 1);
    assert_eq!(position.to_string(), "2:1");
}

// =============================================================================
// FILE SYSTEM LOADER
// =============================================================================

#[test]
fn test_file_system_loader_maps_uris_to_paths() {
    let dir = workspace();
    let loader = FileSystemLoader::new(dir.path());

    assert_eq!(loader.load(&"sub/circle.types".into()).unwrap(), "type Circle extends Shape;");
    assert_eq!(
        loader.uri_of(&dir.path().join("sub").join("circle.types")),
        Some(ResourceUri::new("sub/circle.types"))
    );
    assert!(matches!(
        loader.load(&"absent.types".into()),
        Err(Error::ResourceNotFound(_))
    ));
}

#[test]
fn test_linking_demand_loads_from_disk() {
    let dir = workspace();
    let mut set = types_set().with_loader(FileSystemLoader::new(dir.path()));
    set.load_resource("main.types", "type Main;").unwrap();

    let node = set.get_node(&uri("sub/circle.types#//@elements.0")).unwrap();
    assert_eq!(node.name(), Some("Circle"));
    assert_eq!(set.len(), 2);
}

#[test]
fn test_loader_errors_propagate() -> Result<()> {
    let dir = workspace();
    let mut set = types_set().with_loader(FileSystemLoader::new(dir.path()));

    set.ensure_loaded(&"shapes.types".into())?;
    assert!(set.ensure_loaded(&"absent.types".into()).is_err());
    assert!(set.resource(&"shapes.types".into()).is_some_and(|r| r.is_loaded()));
    Ok(())
}
