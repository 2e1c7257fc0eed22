//! Project name file → workbook path

use crate::error::{FuseError, FuseResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Workbook file names are `<prefix><project>.xlsm`
pub const WORKBOOK_PREFIX: &str = "OPGEE_3.0c_";
pub const WORKBOOK_EXTENSION: &str = "xlsm";

/// Read the project name, dropping all whitespace
pub fn read_project_name(path: &Path) -> FuseResult<String> {
    let content = fs::read_to_string(path).map_err(|e| {
        FuseError::Project(format!("cannot read {}: {}", path.display(), e))
    })?;
    let name: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    if name.is_empty() {
        return Err(FuseError::Project(format!(
            "{} does not contain a project name",
            path.display()
        )));
    }
    Ok(name)
}

/// Path of the project's workbook inside `dir`
pub fn workbook_path(dir: &Path, project: &str) -> PathBuf {
    dir.join(format!("{WORKBOOK_PREFIX}{project}.{WORKBOOK_EXTENSION}"))
}

/// Resolve the workbook from a project name file
pub fn resolve_workbook(project_file: &Path, workbook_dir: &Path) -> FuseResult<PathBuf> {
    let project = read_project_name(project_file)?;
    Ok(workbook_path(workbook_dir, &project))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_project_name_strips_whitespace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project_name.txt");
        fs::write(&path, " North Sea 2024 \n").unwrap();

        assert_eq!(read_project_name(&path).unwrap(), "NorthSea2024");
    }

    #[test]
    fn test_read_project_name_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project_name.txt");
        fs::write(&path, "  \n").unwrap();

        assert!(matches!(read_project_name(&path), Err(FuseError::Project(_))));
    }

    #[test]
    fn test_read_project_name_missing_file() {
        let result = read_project_name(Path::new("no/such/project_name.txt"));
        assert!(matches!(result, Err(FuseError::Project(_))));
    }

    #[test]
    fn test_resolve_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project_name.txt");
        fs::write(&path, "TestProject").unwrap();

        let workbook = resolve_workbook(&path, Path::new("data")).unwrap();
        assert_eq!(workbook, Path::new("data").join("OPGEE_3.0c_TestProject.xlsm"));
    }
}
