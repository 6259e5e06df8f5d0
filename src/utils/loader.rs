// File: loader.rs
// Directory scanning for structure files and manifests

use std::path::{Path, PathBuf};

use crate::error::{LoopwarpError, Result};

const ALLOWED_EXTENSIONS: [&str; 3] = [".pdb", ".pdb.gz", ".ent"];

pub fn is_structure_file(path: &str) -> bool {
    ALLOWED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// File names (not paths) of the structure files directly inside `dir`
pub fn structure_file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_file() {
            if let Some(name) = entry.file_name().to_str() {
                if is_structure_file(name) {
                    names.push(name.to_string());
                }
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Names of the sub-directories of `dir`, sorted.
pub fn list_subdirectories(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// The one file in `dir` whose name ends with `suffix`.
/// None or several matches are both errors.
pub fn find_single_file(dir: &Path, suffix: &str) -> Result<PathBuf> {
    let mut matches: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_match = path.is_file()
            && path.file_name().and_then(|n| n.to_str()).map_or(false, |n| n.ends_with(suffix));
        if is_match {
            matches.push(path);
        }
    }
    let pattern = format!("*{}", suffix);
    match matches.len() {
        0 => Err(LoopwarpError::MissingManifest { pattern, dir: dir.display().to_string() }),
        1 => Ok(matches.remove(0)),
        _ => Err(LoopwarpError::AmbiguousManifest { pattern, dir: dir.display().to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_listing_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("b.pdb"), "").unwrap();
        fs::write(root.join("a.pdb.gz"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join("apo_holo_summary.csv"), "").unwrap();
        fs::create_dir(root.join("complex1")).unwrap();
        fs::write(root.join("complex1").join("c.pdb"), "").unwrap();

        assert_eq!(structure_file_names(root).unwrap(), vec!["a.pdb.gz".to_string(), "b.pdb".to_string()]);
        assert_eq!(list_subdirectories(root).unwrap(), vec!["complex1".to_string()]);
        assert_eq!(structure_file_names(&root.join("complex1")).unwrap(), vec!["c.pdb".to_string()]);

        let manifest = find_single_file(root, "summary.csv").unwrap();
        assert!(manifest.ends_with("apo_holo_summary.csv"));
        fs::write(root.join("other_summary.csv"), "").unwrap();
        assert!(matches!(find_single_file(root, "summary.csv"), Err(LoopwarpError::AmbiguousManifest { .. })));
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_single_file(dir.path(), "summary.csv").unwrap_err();
        assert!(matches!(err, LoopwarpError::MissingManifest { .. }));
        assert!(err.to_string().contains("*summary.csv"));
    }
}
