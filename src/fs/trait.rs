//! FileSystem trait definition

use std::io;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// A directory entry returned by read_dir
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }
}

/// Abstraction over the handful of file system reads classification needs
pub trait FileSystem: Send + Sync {
    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// List directory contents, sorted by file name
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Whether `path` exists and carries any execute permission bit.
    /// A missing path is `Ok(false)`, other stat failures are errors.
    fn is_executable(&self, path: &Path) -> io::Result<bool>;

    /// Entries directly under `dir` whose names end with `suffix`
    fn files_with_suffix(&self, dir: &Path, suffix: &str) -> io::Result<Vec<PathBuf>> {
        let entries = match self.read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(entries
            .into_iter()
            .filter(|e| e.file_type != FileType::Directory)
            .filter(|e| e.name.ends_with(suffix))
            .map(|e| e.path)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_entry() {
        let entry = DirEntry {
            path: PathBuf::from("/test/app.runtimeconfig.json"),
            name: "app.runtimeconfig.json".to_string(),
            file_type: FileType::File,
        };
        assert_eq!(entry.path(), Path::new("/test/app.runtimeconfig.json"));
        assert_eq!(entry.file_name(), "app.runtimeconfig.json");
        assert_eq!(entry.file_type, FileType::File);
    }
}
