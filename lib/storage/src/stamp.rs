// Filename stamping for freshly created stores
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::store::exists_and_nonempty;

/// Filesystem-safe UTC token, e.g. `20260107T121314Z`.
pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Extension used when the requested path has none.
pub const DEFAULT_EXTENSION: &str = "csv";

/// Pick the file a write should go to.
///
/// An existing, non-empty store is always continued as-is. Otherwise, when
/// stamping is enabled, `<stem>_<token>.<ext>` is returned next to the
/// requested path so each fresh run gets its own dataset file.
///
/// Returns `(resolved_path, stamped)`.
pub fn resolve_stamped_path(path: &Path, enabled: bool, now: DateTime<Utc>) -> (PathBuf, bool) {
    if !enabled || exists_and_nonempty(path) {
        return (path.to_path_buf(), false);
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    let stamped = format!("{}_{}.{}", stem, now.format(FILENAME_TIMESTAMP_FORMAT), extension);

    (path.with_file_name(stamped), true)
}

/// [`resolve_stamped_path`] against the current time.
pub fn resolve_stamped_path_now(path: &Path, enabled: bool) -> (PathBuf, bool) {
    resolve_stamped_path(path, enabled, Utc::now())
}
