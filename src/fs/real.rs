use super::{DirEntry, FileSystem, FileType};
use std::fs;
use std::io;
use std::path::Path;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut result = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            let file_type = if path.is_file() {
                FileType::File
            } else if path.is_dir() {
                FileType::Directory
            } else {
                FileType::Symlink
            };

            result.push(DirEntry {
                path,
                name,
                file_type,
            });
        }

        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    #[cfg(unix)]
    fn is_executable(&self, path: &Path) -> io::Result<bool> {
        use std::os::unix::fs::PermissionsExt;

        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_file() && meta.permissions().mode() & 0o111 != 0),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[cfg(not(unix))]
    fn is_executable(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path();

        fs::create_dir(base.join("subdir")).unwrap();
        fs::write(base.join("b.runtimeconfig.json"), "{}").unwrap();
        fs::write(base.join("a.runtimeconfig.json"), "{}").unwrap();
        fs::write(base.join("app.csproj"), "<Project />").unwrap();

        dir
    }

    #[test]
    fn test_read_dir_is_sorted() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let entries = fs.read_dir(temp.path()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.file_name()).collect();

        assert_eq!(
            names,
            vec![
                "a.runtimeconfig.json",
                "app.csproj",
                "b.runtimeconfig.json",
                "subdir"
            ]
        );
    }

    #[test]
    fn test_files_with_suffix() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let files = fs
            .files_with_suffix(temp.path(), ".runtimeconfig.json")
            .unwrap();
        assert_eq!(
            files,
            vec![
                temp.path().join("a.runtimeconfig.json"),
                temp.path().join("b.runtimeconfig.json"),
            ]
        );
    }

    #[test]
    fn test_files_with_suffix_missing_dir() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let files = fs
            .files_with_suffix(&temp.path().join("nope"), ".csproj")
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_read_to_string_missing_file() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let err = fs
            .read_to_string(&temp.path().join("missing.csproj"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let exe = temp.path().join("app");
        std::fs::write(&exe, "").unwrap();
        assert!(!fs.is_executable(&exe).unwrap());

        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(fs.is_executable(&exe).unwrap());

        assert!(!fs.is_executable(&temp.path().join("missing")).unwrap());
    }
}
