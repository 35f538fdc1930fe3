//! Local archive: the directory tree is the only record of what has been
//! mirrored. A photo is archived iff its computed path exists; there is no
//! manifest to keep in step with the files.

pub mod paths;

use std::io;
use std::path::{Path, PathBuf};

pub use paths::{is_mappable, is_safe_collection_id, sanitize, ArchiveLayout};

/// Answers "is this entry already archived?".
///
/// The engine only ever asks this question, so a database-backed index can
/// replace the filesystem without touching the sync logic.
pub trait ArchiveIndex: Send + Sync {
    fn exists(&self, collection_id: &str, title: &str) -> bool;
}

/// Filesystem-backed index over an [`ArchiveLayout`].
#[derive(Debug, Clone)]
pub struct FsArchiveIndex {
    layout: ArchiveLayout,
}

impl FsArchiveIndex {
    pub fn new(layout: ArchiveLayout) -> Self {
        Self { layout }
    }
}

impl ArchiveIndex for FsArchiveIndex {
    fn exists(&self, collection_id: &str, title: &str) -> bool {
        self.layout.photo_path(collection_id, title).exists()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasOutcome {
    Created,
    AlreadyExists,
}

/// Create `dir` and any missing parents.
pub async fn ensure_dir(dir: &Path) -> io::Result<()> {
    tokio::fs::create_dir_all(dir).await
}

/// Link `base/<sanitized album title>` to the album directory.
///
/// The link target is relative to the base directory so the alias stays
/// valid when the archive is mounted or moved elsewhere.
pub async fn link_album_alias(
    layout: &ArchiveLayout,
    collection_id: &str,
    album_title: &str,
) -> io::Result<AliasOutcome> {
    let alias = layout.alias_path(album_title);
    let target = PathBuf::from(collection_id);

    if alias == layout.album_dir(collection_id) {
        // Title and id sanitise to the same name; the directory is its own alias.
        return Ok(AliasOutcome::AlreadyExists);
    }

    match symlink_dir(&target, &alias).await {
        Ok(()) => Ok(AliasOutcome::Created),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(AliasOutcome::AlreadyExists),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
async fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    tokio::fs::symlink(target, link).await
}

#[cfg(windows)]
async fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    tokio::fs::symlink_dir(target, link).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_index_reports_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ArchiveLayout::new(tmp.path());
        std::fs::create_dir_all(layout.album_dir("42")).unwrap();
        std::fs::write(layout.photo_path("42", "a?b.jpg"), b"jpeg").unwrap();

        let index = FsArchiveIndex::new(layout);
        assert!(index.exists("42", "a?b.jpg"));
        assert!(index.exists("42", "a/b.jpg"));
        assert!(!index.exists("42", "other.jpg"));
        assert!(!index.exists("43", "a?b.jpg"));
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("42");
        ensure_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
        // Idempotent
        ensure_dir(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_dir_fails_under_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("blocker");
        std::fs::write(&file, b"x").unwrap();
        assert!(ensure_dir(&file.join("42")).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_link_album_alias_creates_then_skips() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ArchiveLayout::new(tmp.path());
        std::fs::create_dir_all(layout.album_dir("42")).unwrap();
        std::fs::write(layout.photo_path("42", "p.jpg"), b"jpeg").unwrap();

        let first = link_album_alias(&layout, "42", "Summer/2014").await.unwrap();
        assert_eq!(first, AliasOutcome::Created);

        let alias = layout.alias_path("Summer/2014");
        assert_eq!(alias, tmp.path().join("Summer_2014"));
        assert!(alias.join("p.jpg").exists());

        let second = link_album_alias(&layout, "42", "Summer/2014").await.unwrap();
        assert_eq!(second, AliasOutcome::AlreadyExists);
    }

    #[tokio::test]
    async fn test_link_album_alias_same_name_as_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ArchiveLayout::new(tmp.path());
        std::fs::create_dir_all(layout.album_dir("42")).unwrap();
        let outcome = link_album_alias(&layout, "42", "42").await.unwrap();
        assert_eq!(outcome, AliasOutcome::AlreadyExists);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_link_album_alias_missing_base_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ArchiveLayout::new(tmp.path().join("does-not-exist"));
        let result = link_album_alias(&layout, "42", "Holiday").await;
        assert!(result.is_err());
    }
}
