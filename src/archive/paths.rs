use std::path::{Component, Path, PathBuf};

/// Letters outside ASCII that titles may keep verbatim.
const EXTRA_ALLOWED: &[char] = &['Ä', 'ä', 'Ö', 'ö'];

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' ' | '.') || EXTRA_ALLOWED.contains(&c)
}

/// Replace every character outside the allow-list with `_`.
///
/// The mapping is one underscore per character, so `"a/b"` and `"a?b"` both
/// become `"a_b"`. Titles that collide after sanitising share one archive file.
pub fn sanitize(title: &str) -> String {
    title
        .chars()
        .map(|c| if is_allowed(c) { c } else { '_' })
        .collect()
}

/// Whether a sanitised title can name a file inside an album directory.
///
/// `""`, `"."` and `".."` would resolve to the album directory or its parent.
pub fn is_mappable(sanitized: &str) -> bool {
    !matches!(sanitized, "" | "." | "..")
}

/// Whether a remote album id can be used as one directory under the base.
///
/// Rejects empty ids, absolute paths, `.`/`..` and anything with a separator.
pub fn is_safe_collection_id(id: &str) -> bool {
    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !id.contains(['/', '\\'])
}

/// Pure mapping from archive coordinates to paths under the base directory.
#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    base: PathBuf,
}

impl ArchiveLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// `base/<collection id>`
    pub fn album_dir(&self, collection_id: &str) -> PathBuf {
        self.base.join(collection_id)
    }

    /// `base/<collection id>/<sanitized title>`
    pub fn photo_path(&self, collection_id: &str, title: &str) -> PathBuf {
        self.album_dir(collection_id).join(sanitize(title))
    }

    /// `base/<sanitized album title>`, the human-friendly alias of an album
    /// directory.
    pub fn alias_path(&self, album_title: &str) -> PathBuf {
        self.base.join(sanitize(album_title))
    }
}
