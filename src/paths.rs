//! Pure path-string transforms and recursive directory creation.
//!
//! All functions accept either `/` or `\` as a separator. The split/join
//! helpers are stateless string transforms; only [`create_dir_tree`] touches
//! the filesystem.

use std::io;
use std::path::MAIN_SEPARATOR;

use tracing::debug;

use crate::error::FsError;

/// Characters treated as path separators in every helper here.
const SEPARATORS: [char; 2] = ['/', '\\'];

/// Create every missing directory level along `path`.
///
/// The path is split into segments; with fewer than two segments (empty input
/// or a bare volume) there is no work to perform. Levels are then created one
/// at a time. The first segment is treated as the volume and never created.
/// Intermediate levels may fail with access-denied or already-exists; only
/// the final segment's outcome is authoritative, and "already exists" is
/// accepted there, so repeated calls are idempotent.
///
/// On Windows the directory is built in extended-length form (`\\?\` prefix)
/// to support paths beyond the traditional length limit.
///
/// # Errors
///
/// Fails if creating the final segment fails for any reason other than
/// "already exists", with the OS error as source.
pub fn create_dir_tree(path: &str) -> Result<(), FsError> {
    let segments: Vec<&str> = path.split(SEPARATORS).filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return Ok(());
    }

    #[cfg(windows)]
    let mut target = String::from(r"\\?\");
    #[cfg(not(windows))]
    let mut target = if path.starts_with(SEPARATORS) {
        String::from("/")
    } else {
        String::new()
    };

    let mut it = segments.into_iter();
    if let Some(volume) = it.next() {
        target.push_str(volume);
        target.push(MAIN_SEPARATOR);
    }

    let mut last = Ok(());
    for segment in it {
        target.push_str(segment);
        target.push(MAIN_SEPARATOR);
        last = std::fs::create_dir(&target);
    }

    match last {
        Ok(()) => {
            debug!(path = %display_path(&target), "created directory tree");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(source) => Err(FsError::CreateDir {
            path: display_path(&target),
            source,
        }),
    }
}

/// The directory portion of `filepath`: everything up to and including the
/// last separator.
///
/// Input already ending in a separator is returned unchanged; input without
/// any separator has no directory portion and yields `""`.
#[must_use]
pub fn directory_part(filepath: &str) -> &str {
    if filepath.is_empty() {
        return "";
    }
    if filepath.ends_with(SEPARATORS) {
        return filepath;
    }
    match filepath.rfind(SEPARATORS) {
        Some(i) => &filepath[..=i],
        None => "",
    }
}

/// The trailing component of `filepath` after the last separator, or the
/// whole input if it contains none.
#[must_use]
pub fn file_part(filepath: &str) -> &str {
    match filepath.rfind(SEPARATORS) {
        Some(i) => &filepath[i + 1..],
        None => filepath,
    }
}

/// Concatenate `directory` and `file` with exactly one separator between them.
///
/// # Errors
///
/// Fails immediately (no OS call) if either argument is empty.
pub fn make_path(directory: &str, file: &str) -> Result<String, FsError> {
    if directory.is_empty() || file.is_empty() {
        return Err(FsError::EmptyPathComponent);
    }

    let mut result = String::with_capacity(directory.len() + file.len() + 1);
    result.push_str(directory);
    if !directory.ends_with(SEPARATORS) {
        result.push(MAIN_SEPARATOR);
    }
    result.push_str(file);
    Ok(result)
}

/// Path as shown in errors and logs, with the extended-length prefix
/// stripped back off on Windows.
fn display_path(target: &str) -> String {
    #[cfg(windows)]
    {
        dunce::simplified(std::path::Path::new(target))
            .display()
            .to_string()
    }
    #[cfg(not(windows))]
    {
        target.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
