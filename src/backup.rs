//! Backup external collaborator (§6/§4.H).
//!
//! Copies the original subtitle into a sibling `backup/` directory with an
//! ISO-8601 timestamp suffix before any rewrite, simplified from the
//! teacher's `FileManager` (no transactional rollback — just copy-before-write,
//! since this crate's only mutation is a single corrected-SRT write).

use crate::error::SubSyncResult;
use std::path::{Path, PathBuf};

/// Copy `original` into `<parent>/backup/<stem>.<timestamp>.srt`, creating
/// the `backup/` directory if needed. Returns the backup's path.
pub fn backup_before_write(original: &Path, timestamp: &str) -> SubSyncResult<PathBuf> {
    let parent = original.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent.join("backup");
    std::fs::create_dir_all(&backup_dir)?;

    let stem = original
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("subtitle");
    let ext = original
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("srt");
    let backup_path = backup_dir.join(format!("{stem}.{timestamp}.{ext}"));

    std::fs::copy(original, &backup_path)?;
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copies_into_sibling_backup_dir() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("movie.srt");
        std::fs::write(&original, "1\n00:00:00,000 --> 00:00:01,000\nhi\n\n").unwrap();

        let backup_path = backup_before_write(&original, "2026-07-31T00-00-00Z").unwrap();

        assert!(backup_path.exists());
        assert_eq!(backup_path.parent().unwrap(), dir.path().join("backup"));
        assert_eq!(
            std::fs::read_to_string(&backup_path).unwrap(),
            std::fs::read_to_string(&original).unwrap()
        );
    }
}
