/*!
 * Tests for file utility functionality
 */

use anyhow::Result;
use lintra::file_utils::FileManager;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_read_write_roundtrip_withUnicodeContent_shouldPreserveBytes() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("messages.yml");
    let content = "greeting: \"Xin chào %player%\"\nfarewell: \"Tạm biệt\"\n";

    FileManager::write_to_file(&path, content)?;
    assert!(FileManager::file_exists(&path));
    assert_eq!(FileManager::read_to_string(&path)?, content);
    Ok(())
}

#[test]
fn test_write_to_file_withMissingParent_shouldCreateDirectories() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("nested/deeper/out.yml");

    FileManager::write_to_file(&path, "a: 1")?;
    assert!(FileManager::file_exists(&path));
    Ok(())
}

#[test]
fn test_find_files_withMixedExtensions_shouldFilterAndSort() -> Result<()> {
    let dir = tempdir()?;
    FileManager::write_to_file(dir.path().join("b.yml"), "b")?;
    FileManager::write_to_file(dir.path().join("a.yml"), "a")?;
    FileManager::write_to_file(dir.path().join("sub/c.yml"), "c")?;
    FileManager::write_to_file(dir.path().join("ignored.json"), "{}")?;

    let found = FileManager::find_files(dir.path(), "yml")?;
    assert_eq!(found.len(), 3);
    assert!(found[0].ends_with("a.yml"));
    // Dotted and bare extensions are both accepted
    let dotted = FileManager::find_files(dir.path(), ".yml")?;
    assert_eq!(dotted.len(), 3);
    Ok(())
}

#[test]
fn test_generate_output_path_shouldInsertLanguageBeforeExtension() {
    let output = FileManager::generate_output_path(Path::new("/tmp/messages.yml"), "Vietnamese");
    assert_eq!(output, Path::new("/tmp/messages.vietnamese.yml"));

    let no_ext = FileManager::generate_output_path(Path::new("/tmp/README"), "French");
    assert_eq!(no_ext, Path::new("/tmp/README.french"));
}

#[test]
fn test_read_to_string_withMissingFile_shouldErrorWithPath() {
    let result = FileManager::read_to_string("/definitely/not/here.yml");
    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("here.yml"));
}
