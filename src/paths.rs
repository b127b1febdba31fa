use anyhow::Result;
use chrono::NaiveDate;
use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Folder created under the documents directory when no backup directory is given.
pub const DEFAULT_BACKUP_FOLDER: &str = "WingetBackups";

/// Return `directory/base_name + extension`, or the first
/// `directory/base_name_N + extension` (N = 1, 2, ...) that does not exist yet.
///
/// `extension` is appended verbatim, so it may be a plain extension (`.json`)
/// or a descriptive suffix (`_non_winget_apps.txt`). The file is not created;
/// a path that appears between this check and the caller's write is not guarded.
#[tracing::instrument(skip(runtime))]
pub fn resolve_unique_path<R: Runtime>(
    runtime: &R,
    directory: &Path,
    base_name: &str,
    extension: &str,
) -> PathBuf {
    let candidate = directory.join(format!("{}{}", base_name, extension));
    if !runtime.exists(&candidate) {
        return candidate;
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = directory.join(format!("{}_{}{}", base_name, counter, extension));
        if !runtime.exists(&candidate) {
            debug!("Allocated {:?} after {} collision(s)", candidate, counter);
            return candidate;
        }
        counter += 1;
    }
}

/// Get the default backup directory
#[tracing::instrument(skip(runtime))]
pub fn default_backup_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let parent = match runtime.document_dir().or_else(|| runtime.home_dir()) {
        Some(dir) => dir,
        None => runtime.current_dir()?,
    };
    Ok(parent.join(DEFAULT_BACKUP_FOLDER))
}

/// File stem for backups taken on `date`, e.g. `winget_backup_2026-10-18`.
pub fn default_base_name(date: NaiveDate) -> String {
    format!("winget_backup_{}", date.format("%Y-%m-%d"))
}

/// The file name of `path` without its final extension.
pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn runtime_with_existing(existing: &[&str]) -> MockRuntime {
        let existing: HashSet<PathBuf> = existing.iter().map(PathBuf::from).collect();
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .returning(move |p| existing.contains(p));
        runtime
    }

    #[test]
    fn test_resolve_returns_base_when_free() {
        let runtime = runtime_with_existing(&[]);
        let path = resolve_unique_path(&runtime, Path::new("dir"), "backup", ".json");
        assert_eq!(path, PathBuf::from("dir").join("backup.json"));
    }

    #[test]
    fn test_resolve_skips_existing_base() {
        let runtime = runtime_with_existing(&["dir/backup.json"]);
        let path = resolve_unique_path(&runtime, Path::new("dir"), "backup", ".json");
        assert_eq!(path, PathBuf::from("dir").join("backup_1.json"));
    }

    #[test]
    fn test_resolve_skips_every_taken_counter() {
        let runtime = runtime_with_existing(&[
            "dir/backup.json",
            "dir/backup_1.json",
            "dir/backup_2.json",
        ]);
        let path = resolve_unique_path(&runtime, Path::new("dir"), "backup", ".json");
        assert_eq!(path, PathBuf::from("dir").join("backup_3.json"));
    }

    #[test]
    fn test_resolve_counter_goes_before_descriptive_suffix() {
        let runtime = runtime_with_existing(&["out/backup_non_winget_apps.txt"]);
        let path = resolve_unique_path(&runtime, Path::new("out"), "backup", "_non_winget_apps.txt");
        assert_eq!(path, PathBuf::from("out").join("backup_1_non_winget_apps.txt"));
    }

    #[test]
    fn test_resolve_only_checks_candidates_in_order() {
        let mut runtime = MockRuntime::new();
        let mut seq = mockall::Sequence::new();
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("d").join("b.json")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| true);
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("d").join("b_1.json")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| false);

        let path = resolve_unique_path(&runtime, Path::new("d"), "b", ".json");
        assert_eq!(path, PathBuf::from("d").join("b_1.json"));
    }

    #[test]
    fn test_resolve_yields_new_paths_as_files_are_created() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();

        let mut names = Vec::new();
        for _ in 0..3 {
            let path = resolve_unique_path(&runtime, dir.path(), "backup", ".json");
            assert!(!path.exists());
            std::fs::write(&path, "{}").unwrap();
            names.push(path.file_name().unwrap().to_string_lossy().into_owned());
        }

        assert_eq!(names, vec!["backup.json", "backup_1.json", "backup_2.json"]);
    }

    #[test]
    fn test_default_backup_dir_prefers_documents() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_document_dir()
            .returning(|| Some(PathBuf::from("/home/user/Documents")));
        runtime.expect_home_dir().never();
        runtime.expect_current_dir().never();

        let dir = default_backup_dir(&runtime).unwrap();
        assert_eq!(dir, PathBuf::from("/home/user/Documents").join(DEFAULT_BACKUP_FOLDER));
    }

    #[test]
    fn test_default_backup_dir_falls_back_to_home_then_cwd() {
        let mut runtime = MockRuntime::new();
        runtime.expect_document_dir().returning(|| None);
        runtime
            .expect_home_dir()
            .returning(|| Some(PathBuf::from("/home/user")));
        assert_eq!(
            default_backup_dir(&runtime).unwrap(),
            PathBuf::from("/home/user").join(DEFAULT_BACKUP_FOLDER)
        );

        let mut runtime = MockRuntime::new();
        runtime.expect_document_dir().returning(|| None);
        runtime.expect_home_dir().returning(|| None);
        runtime
            .expect_current_dir()
            .returning(|| Ok(PathBuf::from("/work")));
        assert_eq!(
            default_backup_dir(&runtime).unwrap(),
            PathBuf::from("/work").join(DEFAULT_BACKUP_FOLDER)
        );
    }

    #[test]
    fn test_default_base_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(default_base_name(date), "winget_backup_2026-03-07");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(Path::new("dir/backup_1.json")).as_deref(), Some("backup_1"));
        assert_eq!(file_stem(Path::new("backup")).as_deref(), Some("backup"));
        assert_eq!(file_stem(Path::new("")), None);
    }
}
