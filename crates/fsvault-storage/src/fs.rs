use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use fsvault_core::fs::{FileSystem, FsError, Stat};
use tempfile::NamedTempFile;
use tokio::fs;

/// Persistent per-user document root (survives cache purges).
pub fn document_directory() -> Option<String> {
    dirs::data_dir().map(|p| p.to_string_lossy().into_owned())
}

/// Volatile per-user cache root.
pub fn cache_directory() -> Option<String> {
    dirs::cache_dir().map(|p| p.to_string_lossy().into_owned())
}

/// Filesystem provider over the local disk.
/// Writes go through a temp file in the target directory and are renamed into
/// place, so readers never see a half-written entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn stat(&self, path: &str) -> Result<Stat, FsError> {
        match fs::metadata(path).await {
            Ok(meta) => Ok(Stat {
                exists: true,
                is_directory: meta.is_dir(),
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Stat::default()),
            Err(err) => Err(io_err("stat", path, err)),
        }
    }

    async fn mkdir(&self, path: &str, recursive: bool) -> Result<(), FsError> {
        let result = if recursive {
            fs::create_dir_all(path).await
        } else {
            fs::create_dir(path).await
        };
        result.map_err(|err| io_err("mkdir", path, err))
    }

    async fn read_to_string(&self, path: &str) -> Result<String, FsError> {
        fs::read_to_string(path)
            .await
            .map_err(|err| io_err("read", path, err))
    }

    async fn write(&self, path: &str, contents: &str) -> Result<(), FsError> {
        let target = PathBuf::from(path);
        let contents = contents.to_string();
        let owned_path = path.to_string();
        tokio::task::spawn_blocking(move || write_atomic(&target, contents.as_bytes()))
            .await
            .map_err(|err| FsError::Io {
                op: "write",
                path: owned_path,
                reason: err.to_string(),
            })?
            .map_err(|err| io_err("write", path, err))
    }

    async fn delete(&self, path: &str, idempotent: bool) -> Result<(), FsError> {
        let removed = match fs::symlink_metadata(path).await {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).await,
            Ok(_) => fs::remove_file(path).await,
            Err(err) => Err(err),
        };
        match removed {
            Ok(()) => Ok(()),
            Err(err) if idempotent && err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_err("delete", path, err)),
        }
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>, FsError> {
        let mut entries = fs::read_dir(path)
            .await
            .map_err(|err| io_err("list", path, err))?;
        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| io_err("list", path, err))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn io_err(op: &'static str, path: &str, err: std::io::Error) -> FsError {
    if err.kind() == ErrorKind::NotFound {
        FsError::NotFound {
            path: path.to_string(),
        }
    } else {
        FsError::Io {
            op,
            path: path.to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn stat_reports_missing_and_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = LocalFileSystem.stat(&join(&dir, "nope")).await.expect("stat");
        assert!(!missing.exists);

        let root = LocalFileSystem
            .stat(&dir.path().to_string_lossy())
            .await
            .expect("stat");
        assert!(root.exists && root.is_directory);
    }

    #[tokio::test]
    async fn write_replaces_existing_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = join(&dir, "entry");
        LocalFileSystem.write(&path, "first").await.expect("write");
        LocalFileSystem.write(&path, "second").await.expect("overwrite");

        assert_eq!(
            LocalFileSystem.read_to_string(&path).await.expect("read"),
            "second"
        );
        let names = LocalFileSystem
            .list_dir(&dir.path().to_string_lossy())
            .await
            .expect("list");
        assert_eq!(names, vec!["entry".to_string()]);
    }

    #[tokio::test]
    async fn write_into_missing_directory_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = LocalFileSystem
            .write(&join(&dir, "missing/entry"), "x")
            .await
            .expect_err("parent missing");
        assert!(matches!(err, FsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn recursive_mkdir_and_idempotent_delete() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = join(&dir, "a/b/c");
        LocalFileSystem.mkdir(&nested, true).await.expect("mkdir");
        LocalFileSystem.mkdir(&nested, true).await.expect("mkdir again");
        assert!(LocalFileSystem.stat(&nested).await.expect("stat").is_directory);

        let top = join(&dir, "a");
        LocalFileSystem.delete(&top, true).await.expect("delete tree");
        LocalFileSystem.delete(&top, true).await.expect("delete again");
        let err = LocalFileSystem.delete(&top, false).await.expect_err("strict");
        assert!(matches!(err, FsError::NotFound { .. }));
    }

    #[test]
    fn well_known_roots_differ() {
        if let (Some(docs), Some(cache)) = (document_directory(), cache_directory()) {
            assert_ne!(docs, cache);
        }
    }
}
