use anyhow::*;
use std::path::{Path, PathBuf};

pub fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Returns the file name of a path with its final extension removed.
pub fn file_basename(path: &Path) -> Result<String> {
    match path.file_stem() {
        Some(stem) => Ok(stem.to_string_lossy().to_string()),
        None => bail!("'{}' has no file name", path_to_string(path)),
    }
}

/// Returns the path `{dir}/{stem}.{ext}`.
pub fn with_extension(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let mut path = dir.to_path_buf();
    path.push(format!("{stem}.{ext}"));
    path
}
