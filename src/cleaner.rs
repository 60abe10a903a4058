use crate::entry::{DirectoryEntry, DirectoryLister};
use crate::error::{RunError, ValidationError};
use crate::filter::{self, AgeThreshold};
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info, warn};

pub trait TrashSink {
    fn trash(&self, path: &Path) -> io::Result<()>;
}

pub struct SystemTrash;

impl TrashSink for SystemTrash {
    fn trash(&self, path: &Path) -> io::Result<()> {
        trash::delete(path).map_err(io::Error::other)
    }
}

pub enum Disposal<'a> {
    Trashed(&'a DirectoryEntry),
    Failed(&'a DirectoryEntry, &'a io::Error),
}

#[derive(Debug)]
pub struct DeletionResult {
    pub deleted: Vec<DirectoryEntry>,
    pub failed: Vec<(DirectoryEntry, io::Error)>,
}

impl DeletionResult {
    pub fn selected_count(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }
}

pub struct Runner<L, S> {
    lister: L,
    sink: S,
}

impl<L: DirectoryLister, S: TrashSink> Runner<L, S> {
    pub fn new(lister: L, sink: S) -> Self {
        Self { lister, sink }
    }

    pub fn preview(
        &self,
        dir: &Path,
        days: i64,
        now: SystemTime,
    ) -> Result<Vec<DirectoryEntry>, RunError> {
        if dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyDirectory.into());
        }
        let threshold = AgeThreshold::new(days)?;

        let entries = self.lister.list(dir).map_err(|source| RunError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut picked = filter::select(&entries, now, threshold).into_iter().peekable();
        let mut selected = Vec::new();
        for entry in &entries {
            if picked.next_if(|p| std::ptr::eq(*p, entry)).is_some() {
                debug!(file = %entry.name, "selected");
                selected.push(entry.clone());
            } else {
                debug!(file = %entry.name, is_dir = entry.is_dir, "skipped");
            }
        }

        debug!(
            dir = %dir.display(),
            listed = entries.len(),
            selected = selected.len(),
            days = threshold.days(),
            "scanned directory"
        );

        Ok(selected)
    }

    /// Trash every entry. A failure is recorded and the remaining entries are still tried.
    pub fn dispose<F>(&self, entries: Vec<DirectoryEntry>, mut on_progress: F) -> DeletionResult
    where
        F: FnMut(Disposal<'_>),
    {
        let mut deleted = Vec::new();
        let mut failed = Vec::new();

        for entry in entries {
            match self.sink.trash(&entry.path) {
                Ok(()) => {
                    debug!(path = %entry.path.display(), "moved to trash");
                    on_progress(Disposal::Trashed(&entry));
                    deleted.push(entry);
                }
                Err(e) => {
                    warn!(path = %entry.path.display(), error = %e, "failed to move to trash");
                    on_progress(Disposal::Failed(&entry, &e));
                    failed.push((entry, e));
                }
            }
        }

        info!(deleted = deleted.len(), failed = failed.len(), "disposal finished");

        DeletionResult { deleted, failed }
    }

    pub fn run(&self, dir: &Path, days: i64, now: SystemTime) -> Result<DeletionResult, RunError> {
        let selected = self.preview(dir, days, now)?;
        Ok(self.dispose(selected, |_| {}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;
    use std::time::Duration;

    fn now() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    fn days_ago(days: u64) -> SystemTime {
        now() - Duration::from_secs(days * 86_400)
    }

    fn entry(name: &str, is_dir: bool, modified: SystemTime) -> DirectoryEntry {
        DirectoryEntry {
            name: name.to_string(),
            path: Path::new("/data").join(name),
            is_dir,
            modified,
        }
    }

    /// Serves a fixed listing and counts how often it was asked.
    struct FakeLister {
        entries: Option<Vec<DirectoryEntry>>,
        calls: Cell<usize>,
    }

    impl FakeLister {
        fn with(entries: Vec<DirectoryEntry>) -> Self {
            Self {
                entries: Some(entries),
                calls: Cell::new(0),
            }
        }

        fn missing() -> Self {
            Self {
                entries: None,
                calls: Cell::new(0),
            }
        }
    }

    impl DirectoryLister for &FakeLister {
        fn list(&self, _dir: &Path) -> io::Result<Vec<DirectoryEntry>> {
            self.calls.set(self.calls.get() + 1);
            self.entries
                .clone()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such directory"))
        }
    }

    /// Records trashed paths and fails for names listed in `broken`.
    #[derive(Default)]
    struct FakeTrash {
        trashed: RefCell<Vec<PathBuf>>,
        broken: Vec<&'static str>,
    }

    impl TrashSink for &FakeTrash {
        fn trash(&self, path: &Path) -> io::Result<()> {
            let name = path.file_name().unwrap().to_str().unwrap();
            if self.broken.iter().any(|b| *b == name) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "file in use"));
            }
            self.trashed.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn test_trashes_old_file_only() {
        let lister = FakeLister::with(vec![
            entry("old.txt", false, days_ago(40)),
            entry("new.txt", false, days_ago(5)),
        ]);
        let sink = FakeTrash::default();

        let result = Runner::new(&lister, &sink)
            .run(Path::new("/data"), 30, now())
            .unwrap();

        assert_eq!(result.deleted_count(), 1);
        assert!(result.failed.is_empty());
        assert_eq!(*sink.trashed.borrow(), vec![PathBuf::from("/data/old.txt")]);
    }

    #[test]
    fn test_only_subdirectory_is_not_an_error() {
        let lister = FakeLister::with(vec![entry("archive", true, days_ago(400))]);
        let sink = FakeTrash::default();

        let result = Runner::new(&lister, &sink)
            .run(Path::new("/data"), 30, now())
            .unwrap();

        assert_eq!(result.selected_count(), 0);
        assert_eq!(result.deleted_count(), 0);
        assert!(result.failed.is_empty());
        assert!(sink.trashed.borrow().is_empty());
    }

    #[test]
    fn test_file_exactly_at_cutoff_is_kept() {
        let lister = FakeLister::with(vec![entry("edge.txt", false, days_ago(30))]);
        let sink = FakeTrash::default();

        let result = Runner::new(&lister, &sink)
            .run(Path::new("/data"), 30, now())
            .unwrap();

        assert_eq!(result.selected_count(), 0);
    }

    #[test]
    fn test_zero_days_fails_before_listing() {
        let lister = FakeLister::with(vec![entry("old.txt", false, days_ago(40))]);
        let sink = FakeTrash::default();

        let err = Runner::new(&lister, &sink)
            .run(Path::new("/data"), 0, now())
            .unwrap_err();

        assert!(matches!(err, RunError::Validation(ValidationError::Threshold(0))));
        assert_eq!(lister.calls.get(), 0);
    }

    #[test]
    fn test_empty_path_fails_before_listing() {
        let lister = FakeLister::with(Vec::new());
        let sink = FakeTrash::default();

        let err = Runner::new(&lister, &sink)
            .run(Path::new(""), 30, now())
            .unwrap_err();

        assert!(matches!(err, RunError::Validation(ValidationError::EmptyDirectory)));
        assert_eq!(lister.calls.get(), 0);
    }

    #[test]
    fn test_missing_directory_aborts_run() {
        let lister = FakeLister::missing();
        let sink = FakeTrash::default();

        let err = Runner::new(&lister, &sink)
            .run(Path::new("/nope"), 30, now())
            .unwrap_err();

        match err {
            RunError::Directory { path, source } => {
                assert_eq!(path, PathBuf::from("/nope"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected directory error, got {other:?}"),
        }
        assert!(sink.trashed.borrow().is_empty());
    }

    #[test]
    fn test_one_failure_does_not_stop_the_rest() {
        let lister = FakeLister::with(vec![
            entry("a.txt", false, days_ago(40)),
            entry("locked.txt", false, days_ago(40)),
            entry("c.txt", false, days_ago(40)),
        ]);
        let sink = FakeTrash {
            broken: vec!["locked.txt"],
            ..Default::default()
        };

        let result = Runner::new(&lister, &sink)
            .run(Path::new("/data"), 30, now())
            .unwrap();

        assert_eq!(result.selected_count(), 3);
        assert_eq!(result.deleted_count(), 2);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].0.name, "locked.txt");
        assert_eq!(result.failed[0].1.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(sink.trashed.borrow().len(), 2);
    }

    #[test]
    fn test_preview_keeps_listing_order_across_skipped_entries() {
        let lister = FakeLister::with(vec![
            entry("a.txt", false, days_ago(90)),
            entry("archive", true, days_ago(90)),
            entry("b.txt", false, days_ago(3)),
            entry("c.txt", false, days_ago(45)),
            entry("d.txt", false, days_ago(30)),
        ]);
        let sink = FakeTrash::default();

        let selected = Runner::new(&lister, &sink)
            .preview(Path::new("/data"), 30, now())
            .unwrap();

        let names: Vec<&str> = selected.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "c.txt"]);
    }

    #[test]
    fn test_preview_does_not_trash() {
        let lister = FakeLister::with(vec![entry("old.txt", false, days_ago(40))]);
        let sink = FakeTrash::default();

        let selected = Runner::new(&lister, &sink)
            .preview(Path::new("/data"), 30, now())
            .unwrap();

        assert_eq!(selected.len(), 1);
        assert!(sink.trashed.borrow().is_empty());
    }

    #[test]
    fn test_dispose_reports_each_attempt_in_order() {
        let lister = FakeLister::with(Vec::new());
        let sink = FakeTrash {
            broken: vec!["b.txt"],
            ..Default::default()
        };
        let entries = vec![
            entry("a.txt", false, days_ago(40)),
            entry("b.txt", false, days_ago(40)),
        ];

        let mut seen = Vec::new();
        Runner::new(&lister, &sink).dispose(entries, |d| match d {
            Disposal::Trashed(e) => seen.push(format!("ok {}", e.name)),
            Disposal::Failed(e, _) => seen.push(format!("err {}", e.name)),
        });

        assert_eq!(seen, vec!["ok a.txt", "err b.txt"]);
    }
}
