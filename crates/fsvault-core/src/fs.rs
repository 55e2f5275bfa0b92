use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use thiserror::Error;

/// Path separator used by every [`FileSystem`] path.
pub const SEPARATOR: char = '/';

/// Errors produced by filesystem providers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FsError {
    /// Requested path does not exist.
    #[error("no such file or directory: {path}")]
    NotFound { path: String },
    /// Underlying I/O failure.
    #[error("{op} failed for {path}: {reason}")]
    Io {
        op: &'static str,
        path: String,
        reason: String,
    },
}

/// Result of a `stat` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    pub exists: bool,
    pub is_directory: bool,
}

/// Hierarchical `/`-separated filesystem used by FileStorage.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Describe a path. A missing path is `exists: false`, not an error.
    async fn stat(&self, path: &str) -> Result<Stat, FsError>;

    /// Create a directory, including missing parents when `recursive`.
    async fn mkdir(&self, path: &str, recursive: bool) -> Result<(), FsError>;

    /// Read a whole file as text.
    async fn read_to_string(&self, path: &str) -> Result<String, FsError>;

    /// Write a whole file, replacing any previous content.
    async fn write(&self, path: &str, contents: &str) -> Result<(), FsError>;

    /// Delete a file or directory tree. With `idempotent`, a missing path is success.
    async fn delete(&self, path: &str, idempotent: bool) -> Result<(), FsError>;

    /// Names of the immediate entries of a directory.
    async fn list_dir(&self, path: &str) -> Result<Vec<String>, FsError>;
}

/// In-memory filesystem for tests. Clones share the same tree.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFileSystem {
    inner: Arc<Mutex<Tree>>,
}

#[derive(Debug, Default)]
struct Tree {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, String>,
}

impl Tree {
    fn is_dir(&self, path: &str) -> bool {
        is_root(path) || self.dirs.contains(path)
    }
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, op: &'static str, path: &str) -> Result<MutexGuard<'_, Tree>, FsError> {
        self.inner.lock().map_err(|err| FsError::Io {
            op,
            path: path.to_string(),
            reason: format!("lock poisoned: {err}"),
        })
    }
}

#[async_trait]
impl FileSystem for InMemoryFileSystem {
    async fn stat(&self, path: &str) -> Result<Stat, FsError> {
        let tree = self.lock("stat", path)?;
        let is_directory = tree.is_dir(path);
        Ok(Stat {
            exists: is_directory || tree.files.contains_key(path),
            is_directory,
        })
    }

    async fn mkdir(&self, path: &str, recursive: bool) -> Result<(), FsError> {
        let mut tree = self.lock("mkdir", path)?;
        if tree.files.contains_key(path) {
            return Err(io_err("mkdir", path, "a file exists at this path"));
        }
        if tree.is_dir(path) {
            return if recursive {
                Ok(())
            } else {
                Err(io_err("mkdir", path, "directory already exists"))
            };
        }

        let mut missing = vec![path.to_string()];
        let mut cursor = parent(path);
        while let Some(dir) = cursor {
            if tree.is_dir(dir) {
                break;
            }
            if tree.files.contains_key(dir) {
                return Err(io_err("mkdir", path, "a parent is a file"));
            }
            if !recursive {
                return Err(FsError::NotFound {
                    path: dir.to_string(),
                });
            }
            missing.push(dir.to_string());
            cursor = parent(dir);
        }
        tree.dirs.extend(missing);
        Ok(())
    }

    async fn read_to_string(&self, path: &str) -> Result<String, FsError> {
        let tree = self.lock("read", path)?;
        if tree.is_dir(path) {
            return Err(io_err("read", path, "is a directory"));
        }
        tree.files.get(path).cloned().ok_or_else(|| FsError::NotFound {
            path: path.to_string(),
        })
    }

    async fn write(&self, path: &str, contents: &str) -> Result<(), FsError> {
        let mut tree = self.lock("write", path)?;
        if tree.is_dir(path) {
            return Err(io_err("write", path, "is a directory"));
        }
        if let Some(dir) = parent(path) {
            if !tree.is_dir(dir) {
                return Err(FsError::NotFound {
                    path: dir.to_string(),
                });
            }
        }
        tree.files.insert(path.to_string(), contents.to_string());
        Ok(())
    }

    async fn delete(&self, path: &str, idempotent: bool) -> Result<(), FsError> {
        let mut tree = self.lock("delete", path)?;
        if tree.files.remove(path).is_some() {
            return Ok(());
        }
        if tree.dirs.remove(path) {
            let prefix = format!("{path}{SEPARATOR}");
            tree.dirs.retain(|d| !d.starts_with(&prefix));
            tree.files.retain(|f, _| !f.starts_with(&prefix));
            return Ok(());
        }
        if idempotent {
            Ok(())
        } else {
            Err(FsError::NotFound {
                path: path.to_string(),
            })
        }
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>, FsError> {
        let tree = self.lock("list", path)?;
        if !tree.is_dir(path) {
            return Err(FsError::NotFound {
                path: path.to_string(),
            });
        }
        let children = tree
            .dirs
            .iter()
            .chain(tree.files.keys())
            .filter(|entry| parent(entry) == Some(path))
            .filter_map(|entry| entry.rsplit(SEPARATOR).next())
            .map(str::to_string)
            .collect();
        Ok(children)
    }
}

fn is_root(path: &str) -> bool {
    path.is_empty() || path == "/"
}

fn parent(path: &str) -> Option<&str> {
    match path.rsplit_once(SEPARATOR) {
        Some(("", _)) if path.len() > 1 => Some("/"),
        Some((dir, _)) if !dir.is_empty() => Some(dir),
        _ => None,
    }
}

fn io_err(op: &'static str, path: &str, reason: &str) -> FsError {
    FsError::Io {
        op,
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recursive_mkdir_creates_parents() {
        let fs = InMemoryFileSystem::new();
        fs.mkdir("/docs/app/store", true).await.expect("mkdir");

        assert!(fs.stat("/docs").await.expect("stat").is_directory);
        assert!(fs.stat("/docs/app/store").await.expect("stat").exists);
    }

    #[tokio::test]
    async fn flat_mkdir_requires_parent() {
        let fs = InMemoryFileSystem::new();
        let err = fs.mkdir("/a/b", false).await.expect_err("parent missing");
        assert_eq!(err, FsError::NotFound { path: "/a".into() });
    }

    #[tokio::test]
    async fn write_needs_existing_directory() {
        let fs = InMemoryFileSystem::new();
        let err = fs.write("/missing/file", "x").await.expect_err("no dir");
        assert!(matches!(err, FsError::NotFound { .. }));

        fs.mkdir("/missing", false).await.expect("mkdir");
        fs.write("/missing/file", "x").await.expect("write");
        assert_eq!(fs.read_to_string("/missing/file").await.expect("read"), "x");
    }

    #[tokio::test]
    async fn list_dir_is_not_recursive() {
        let fs = InMemoryFileSystem::new();
        fs.mkdir("/root/nested", true).await.expect("mkdir");
        fs.write("/root/a", "1").await.expect("write");
        fs.write("/root/nested/b", "2").await.expect("write");

        let mut names = fs.list_dir("/root").await.expect("list");
        names.sort();
        assert_eq!(names, vec!["a".to_string(), "nested".to_string()]);
    }

    #[tokio::test]
    async fn delete_honours_idempotent_flag() {
        let fs = InMemoryFileSystem::new();
        fs.delete("/nope", true).await.expect("idempotent delete");
        let err = fs.delete("/nope", false).await.expect_err("strict delete");
        assert!(matches!(err, FsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn deleting_directory_drops_children() {
        let fs = InMemoryFileSystem::new();
        fs.mkdir("/d", false).await.expect("mkdir");
        fs.write("/d/f", "x").await.expect("write");
        fs.delete("/d", false).await.expect("delete");

        assert!(!fs.stat("/d/f").await.expect("stat").exists);
        assert!(!fs.stat("/d").await.expect("stat").exists);
    }
}
