/*!
 * Tests for file utility functions
 */

use std::path::Path;
use yadtwai::errors::AppError;
use yadtwai::file_utils::FileManager;
use crate::common;

#[test]
fn test_outputPathFor_withPrefix_shouldStripIt() {
    let path = FileManager::output_path_for("out", "docs/guide/intro.md", "docs/").unwrap();
    assert_eq!(path, Path::new("out").join("guide").join("intro.md"));
}

#[test]
fn test_outputPathFor_withoutMatchingPrefix_shouldKeepPath() {
    let path = FileManager::output_path_for("out", "guide/intro.md", "docs/").unwrap();
    assert_eq!(path, Path::new("out").join("guide").join("intro.md"));

    let path = FileManager::output_path_for("out", "/intro.md", "").unwrap();
    assert_eq!(path, Path::new("out").join("intro.md"));
}

#[test]
fn test_outputPathFor_withParentComponent_shouldFail() {
    let error = FileManager::output_path_for("out", "docs/../../etc/passwd", "docs/").unwrap_err();
    assert!(matches!(error, AppError::File(_)));
    assert!(FileManager::output_path_for("out", "docs/", "docs/").is_err());
}

#[test]
fn test_writeToFile_shouldCreateParentDirectories() {
    let temp_dir = common::create_temp_dir().unwrap();
    let target = temp_dir.path().join("a").join("b").join("page.md");

    FileManager::write_to_file(&target, "# Page\n").unwrap();

    assert!(target.is_file());
    assert_eq!(FileManager::read_to_string(&target).unwrap(), "# Page\n");
}

#[test]
fn test_findMarkdownFiles_shouldOnlyReturnMarkdownSorted() {
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(temp_dir.path(), "b.md", "b").unwrap();
    common::create_test_file(temp_dir.path(), "nested/a.MDX", "a").unwrap();
    common::create_test_file(temp_dir.path(), "image.png", "png").unwrap();

    let files = FileManager::find_markdown_files(temp_dir.path()).unwrap();

    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("b.md"));
    assert!(files[1].ends_with("nested/a.MDX"));
}
