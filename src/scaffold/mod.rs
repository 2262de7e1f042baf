pub mod report;

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::util::fs as scaffold_fs;

pub use report::{Console, EntryKind, Event, Outcome, Report, Reporter};

/// Root directory plus the relative entries to create beneath it.
#[derive(Clone, Debug, Serialize)]
pub struct Layout {
    root: Utf8PathBuf,
    directories: Vec<String>,
    files: Vec<String>,
}

impl Layout {
    pub fn new(root: Utf8PathBuf, directories: Vec<String>, files: Vec<String>) -> Result<Self> {
        if !root.is_absolute() {
            bail!("scaffold root {} must be an absolute path", root);
        }
        Ok(Self {
            root,
            directories,
            files,
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn directories(&self) -> &[String] {
        &self.directories
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Apply,
    /// Report what would change without touching the filesystem.
    DryRun,
}

/// Build the whole layout: root, then directories, then files.
pub fn run(layout: &Layout, mode: Mode, reporter: &mut dyn Reporter) -> Result<()> {
    ensure_root(&layout.root, mode, reporter)?;
    ensure_directories(&layout.root, &layout.directories, mode, reporter)?;
    ensure_files(&layout.root, &layout.files, mode, reporter)?;
    Ok(())
}

pub fn ensure_root(root: &Utf8Path, mode: Mode, reporter: &mut dyn Reporter) -> Result<()> {
    let outcome = ensure_directory(root, mode)
        .with_context(|| format!("creating root directory {}", root))?;
    reporter.report(Event {
        kind: EntryKind::Root,
        path: root.to_owned(),
        outcome,
    });
    Ok(())
}

pub fn ensure_directories(
    root: &Utf8Path,
    directories: &[String],
    mode: Mode,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    for entry in directories {
        let path = root.join(entry);
        let outcome =
            ensure_directory(&path, mode).with_context(|| format!("creating directory {}", path))?;
        reporter.report(Event {
            kind: EntryKind::Directory,
            path,
            outcome,
        });
    }
    Ok(())
}

pub fn ensure_files(
    root: &Utf8Path,
    files: &[String],
    mode: Mode,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    for entry in files {
        let path = root.join(entry);
        let outcome = ensure_file(&path, mode).with_context(|| format!("creating file {}", path))?;
        reporter.report(Event {
            kind: EntryKind::File,
            path,
            outcome,
        });
    }
    Ok(())
}

fn ensure_directory(path: &Utf8Path, mode: Mode) -> Result<Outcome> {
    let outcome = match mode {
        Mode::Apply => {
            if scaffold_fs::ensure_dir(path.as_std_path())? {
                Outcome::Created
            } else {
                Outcome::AlreadyExists
            }
        }
        Mode::DryRun => {
            if scaffold_fs::dir_present(path.as_std_path())? {
                Outcome::AlreadyExists
            } else {
                Outcome::WouldCreate
            }
        }
    };
    tracing::debug!(path = %path, ?outcome, "directory");
    Ok(outcome)
}

fn ensure_file(path: &Utf8Path, mode: Mode) -> Result<Outcome> {
    if mode == Mode::DryRun {
        // A build would need the parent as a directory; fail here if it cannot be one.
        if let Some(parent) = path.parent() {
            scaffold_fs::dir_present(parent.as_std_path())
                .with_context(|| format!("checking parent directory {}", parent))?;
        }
        return Ok(if scaffold_fs::file_present(path.as_std_path())? {
            Outcome::AlreadyExists
        } else {
            Outcome::WouldCreate
        });
    }

    // Files may name directories that were never listed.
    if let Some(parent) = path.parent() {
        if scaffold_fs::ensure_dir(parent.as_std_path())
            .with_context(|| format!("creating parent directory {}", parent))?
        {
            tracing::debug!(path = %parent, "created parent directory");
        }
    }

    let outcome = if scaffold_fs::create_empty(path.as_std_path())? {
        Outcome::Created
    } else {
        Outcome::AlreadyExists
    };
    tracing::debug!(path = %path, ?outcome, "file");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn unique_temp_dir() -> Utf8PathBuf {
        let mut dir = std::env::temp_dir();
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        dir.push(format!("scaffold-test-{ts}-{n}"));
        Utf8PathBuf::from_path_buf(dir).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn proj_layout(base: &Utf8Path) -> Layout {
        Layout::new(
            base.join("proj"),
            strings(&["assets", "features/AIAgent"]),
            strings(&["data/menu.json", "App.jsx"]),
        )
        .unwrap()
    }

    fn run_to_report(layout: &Layout, mode: Mode) -> Report {
        let mut report = Report::default();
        run(layout, mode, &mut report).unwrap();
        report
    }

    #[test]
    fn builds_the_full_layout() {
        let base = unique_temp_dir();
        let layout = proj_layout(&base);
        let report = run_to_report(&layout, Mode::Apply);

        let root = layout.root();
        assert!(root.join("assets").is_dir());
        assert!(root.join("features/AIAgent").is_dir());
        assert!(root.join("data").is_dir());
        assert_eq!(fs::metadata(root.join("data/menu.json")).unwrap().len(), 0);
        assert_eq!(fs::metadata(root.join("App.jsx")).unwrap().len(), 0);

        assert_eq!(report.created(), 5);
        assert_eq!(report.existing(), 0);
        let _ = fs::remove_dir_all(base.as_std_path());
    }

    #[test]
    fn events_follow_root_directories_files_order() {
        let base = unique_temp_dir();
        let layout = proj_layout(&base);
        let report = run_to_report(&layout, Mode::Apply);

        let order: Vec<(EntryKind, Utf8PathBuf)> = report
            .events
            .iter()
            .map(|e| (e.kind, e.path.clone()))
            .collect();
        let root = layout.root();
        assert_eq!(
            order,
            vec![
                (EntryKind::Root, root.to_owned()),
                (EntryKind::Directory, root.join("assets")),
                (EntryKind::Directory, root.join("features/AIAgent")),
                (EntryKind::File, root.join("data/menu.json")),
                (EntryKind::File, root.join("App.jsx")),
            ]
        );
        let _ = fs::remove_dir_all(base.as_std_path());
    }

    #[test]
    fn second_run_only_reports_existing() {
        let base = unique_temp_dir();
        let layout = proj_layout(&base);
        run_to_report(&layout, Mode::Apply);

        let report = run_to_report(&layout, Mode::Apply);
        assert_eq!(report.created(), 0);
        assert_eq!(report.events.len(), 5);
        assert!(
            report
                .events
                .iter()
                .all(|e| e.outcome == Outcome::AlreadyExists)
        );
        let _ = fs::remove_dir_all(base.as_std_path());
    }

    #[test]
    fn existing_file_content_is_preserved() {
        let base = unique_temp_dir();
        let layout = proj_layout(&base);
        let menu = layout.root().join("data/menu.json");
        fs::create_dir_all(menu.parent().unwrap().as_std_path()).unwrap();
        fs::write(menu.as_std_path(), "{\"items\": []}").unwrap();

        let report = run_to_report(&layout, Mode::Apply);
        assert_eq!(
            fs::read_to_string(menu.as_std_path()).unwrap(),
            "{\"items\": []}"
        );
        let menu_event = report.events.iter().find(|e| e.path == menu).unwrap();
        assert_eq!(menu_event.outcome, Outcome::AlreadyExists);
        let _ = fs::remove_dir_all(base.as_std_path());
    }

    #[test]
    fn missing_ancestors_are_created_for_files() {
        let base = unique_temp_dir();
        let root = base.join("proj");
        let mut report = Report::default();
        ensure_files(&root, &strings(&["services/api.js"]), Mode::Apply, &mut report).unwrap();

        assert!(root.join("services").is_dir());
        assert!(root.join("services/api.js").is_file());
        assert_eq!(report.events.len(), 1);
        let _ = fs::remove_dir_all(base.as_std_path());
    }

    #[test]
    fn root_reports_existing_directory() {
        let base = unique_temp_dir();
        fs::create_dir_all(base.as_std_path()).unwrap();
        let mut report = Report::default();
        ensure_root(&base, Mode::Apply, &mut report).unwrap();
        assert_eq!(report.events[0].outcome, Outcome::AlreadyExists);
        let _ = fs::remove_dir_all(base.as_std_path());
    }

    #[test]
    fn dry_run_leaves_disk_untouched() {
        let base = unique_temp_dir();
        let layout = proj_layout(&base);
        let report = run_to_report(&layout, Mode::DryRun);

        assert!(!base.exists());
        assert_eq!(report.pending(), 5);
        assert_eq!(report.created(), 0);
    }

    #[test]
    fn dry_run_sees_existing_entries() {
        let base = unique_temp_dir();
        let layout = proj_layout(&base);
        fs::create_dir_all(layout.root().join("assets").as_std_path()).unwrap();

        let report = run_to_report(&layout, Mode::DryRun);
        assert_eq!(report.existing(), 2);
        assert_eq!(report.pending(), 3);
        let _ = fs::remove_dir_all(base.as_std_path());
    }

    #[test]
    fn failure_keeps_earlier_entries() {
        let base = unique_temp_dir();
        let root = base.join("proj");
        fs::create_dir_all(root.as_std_path()).unwrap();
        fs::write(root.join("styles").as_std_path(), "not a directory").unwrap();

        let layout = Layout::new(
            root.clone(),
            strings(&["assets", "styles", "utils"]),
            Vec::new(),
        )
        .unwrap();
        let mut report = Report::default();
        let err = run(&layout, Mode::Apply, &mut report).unwrap_err();

        assert!(err.to_string().contains("styles"));
        let io_err = err.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::NotADirectory);
        assert!(root.join("assets").is_dir());
        assert!(!root.join("utils").exists());
        assert_eq!(report.events.len(), 2);
        let _ = fs::remove_dir_all(base.as_std_path());
    }

    #[test]
    fn directory_where_file_expected_is_an_error() {
        let base = unique_temp_dir();
        let root = base.join("proj");
        fs::create_dir_all(root.join("App.jsx").as_std_path()).unwrap();

        let mut report = Report::default();
        let err = ensure_files(&root, &strings(&["App.jsx"]), Mode::Apply, &mut report).unwrap_err();
        assert!(format!("{err:#}").contains("App.jsx"));
        assert!(report.events.is_empty());
        let _ = fs::remove_dir_all(base.as_std_path());
    }

    #[test]
    fn dry_run_fails_where_parent_is_a_file() {
        let base = unique_temp_dir();
        let root = base.join("proj");
        fs::create_dir_all(root.as_std_path()).unwrap();
        fs::write(root.join("styles").as_std_path(), "not a directory").unwrap();

        let mut report = Report::default();
        let err = ensure_files(
            &root,
            &strings(&["styles/index.css"]),
            Mode::DryRun,
            &mut report,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("parent directory"));
        let io_err = err.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::NotADirectory);
        assert!(report.events.is_empty());

        let err = ensure_files(
            &root,
            &strings(&["styles/index.css"]),
            Mode::Apply,
            &mut report,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("styles"));
        let _ = fs::remove_dir_all(base.as_std_path());
    }

    #[test]
    fn relative_root_is_rejected() {
        assert!(Layout::new(Utf8PathBuf::from("src"), Vec::new(), Vec::new()).is_err());
    }
}
