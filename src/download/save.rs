//! Writing downloaded files to disk without clobbering or escaping the target directory.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use super::classify::BinaryFile;
use crate::constants::DEFAULT_DOWNLOAD_FILENAME;
use crate::error::DriveError;

/// Replaces characters invalid on common filesystems (`/ \ : * ? " < > |` and
/// control characters) with `_`. Dot-only names are neutralized.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() {
        return DEFAULT_DOWNLOAD_FILENAME.to_string();
    }

    let mut components = Path::new(&sanitized).components();
    let is_plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if is_plain {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

/// Picks `dir/filename`, or `dir/stem_N.ext` when that already exists.
#[must_use]
pub fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let filename = sanitize_filename(filename);
    let base_path = dir.join(&filename);
    if !base_path.exists() {
        return base_path;
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename.as_str(), ""),
    };
    for i in 1..1000 {
        let candidate = dir.join(format!("{stem}_{i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(format!("{stem}_{timestamp}{ext}"))
}

/// Writes `file` into `dir` under its (sanitized, de-duplicated) filename.
///
/// # Errors
///
/// Returns [`DriveError::Io`] when the directory cannot be created or the
/// file cannot be written.
pub async fn save_to_dir(file: &BinaryFile, dir: &Path) -> Result<PathBuf, DriveError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DriveError::io(dir, e))?;
    let path = resolve_unique_path(dir, &file.filename);
    debug!(path = %path.display(), "resolved output path");
    tokio::fs::write(&path, &file.bytes)
        .await
        .map_err(|e| DriveError::io(path.clone(), e))?;
    info!(path = %path.display(), bytes = file.bytes.len(), "file saved");
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn file(name: &str, bytes: &[u8]) -> BinaryFile {
        BinaryFile {
            bytes: bytes.to_vec(),
            filename: name.to_string(),
            mime_type: "application/zip".to_string(),
        }
    }

    #[test]
    fn test_sanitize_filename_replaces_separators() {
        assert_eq!(sanitize_filename("a/b\\c:d.txt"), "a_b_c_d.txt");
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
    }

    #[test]
    fn test_sanitize_filename_neutralizes_dot_names() {
        assert_eq!(sanitize_filename(".."), "__");
        assert_eq!(sanitize_filename("."), "_");
        assert_eq!(sanitize_filename(""), "download.zip");
        assert_eq!(sanitize_filename("///"), "download.zip");
    }

    #[test]
    fn test_resolve_unique_path_adds_suffix() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.zip"), b"old").unwrap();
        let path = resolve_unique_path(dir.path(), "a.zip");
        assert_eq!(path, dir.path().join("a_1.zip"));
    }

    #[tokio::test]
    async fn test_save_to_dir_writes_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let saved = save_to_dir(&file("x.zip", b"PK\x03\x04"), dir.path())
            .await
            .unwrap();
        assert_eq!(saved, dir.path().join("x.zip"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"PK\x03\x04");

        let second = save_to_dir(&file("x.zip", b"new"), dir.path()).await.unwrap();
        assert_eq!(second, dir.path().join("x_1.zip"));
        assert_eq!(std::fs::read(dir.path().join("x.zip")).unwrap(), b"PK\x03\x04");
    }

    #[tokio::test]
    async fn test_save_to_dir_cannot_escape_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let saved = save_to_dir(&file("../../etc/passwd", b"x"), dir.path())
            .await
            .unwrap();
        assert_eq!(saved.parent().unwrap(), dir.path());
    }
}
