use anyhow::{Context as _, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{DebounceEventResult, Debouncer, RecommendedCache, new_debouncer};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

const DEBOUNCE: Duration = Duration::from_millis(200);

/// Calls `on_change` whenever one of the ledger files is written, replaced or removed.
///
/// The containing directories are watched instead of the files: spreadsheet
/// programs save by writing a temporary file and renaming it over the ledger,
/// which ends a watch on the old file.
pub struct FileWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl FileWatcher {
    pub fn new<'a, F>(ledgers: impl IntoIterator<Item = &'a Path>, on_change: F) -> Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let ledgers = ledgers
            .into_iter()
            .map(resolve_ledger)
            .collect::<Result<Vec<_>>>()?;
        let directories: BTreeSet<PathBuf> = ledgers
            .iter()
            .filter_map(|ledger| ledger.parent().map(Path::to_path_buf))
            .collect();

        let watched = ledgers.clone();
        let mut debouncer = new_debouncer(DEBOUNCE, None, move |res: DebounceEventResult| {
            let events = match res {
                Ok(events) => events,
                Err(errors) => {
                    error!("Watch error: {:?}", errors);
                    return;
                }
            };

            let relevant = events
                .iter()
                .filter(|e| touches_ledger(&e.event, &watched))
                .count();
            debug!("{} of {} file events touch a ledger", relevant, events.len());

            if relevant > 0 {
                info!("Ledger modification detected: {} events", relevant);
                on_change();
            }
        })?;

        for directory in &directories {
            info!("Watching ledger directory: {}", directory.display());
            debouncer.watch(directory, RecursiveMode::NonRecursive)?;
        }
        for ledger in &ledgers {
            debug!("Reloading on changes to {}", ledger.display());
        }

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

/// Absolute ledger path with a canonical directory, so it compares equal to
/// the paths reported for that directory. The file itself may not exist yet.
fn resolve_ledger(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Ledger path has no file name: {}", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let directory = std::fs::canonicalize(directory)
        .with_context(|| format!("Failed to resolve ledger directory: {}", directory.display()))?;
    Ok(directory.join(file_name))
}

fn touches_ledger(event: &Event, ledgers: &[PathBuf]) -> bool {
    let content_changed = matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    );
    content_changed && event.paths.iter().any(|path| ledgers.contains(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind, RenameMode};

    fn ledgers() -> Vec<PathBuf> {
        vec![
            PathBuf::from("/data/innovat.csv"),
            PathBuf::from("/data/banco.csv"),
        ]
    }

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |event, path| event.add_path(PathBuf::from(path)))
    }

    #[test]
    fn ledger_writes_trigger_reload() {
        let write = event(EventKind::Modify(ModifyKind::Any), &["/data/banco.csv"]);
        assert!(touches_ledger(&write, &ledgers()));

        let removed = event(EventKind::Remove(RemoveKind::File), &["/data/innovat.csv"]);
        assert!(touches_ledger(&removed, &ledgers()));
    }

    #[test]
    fn replace_by_rename_triggers_reload() {
        let rename = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/data/.~lock.banco.csv#", "/data/banco.csv"],
        );
        assert!(touches_ledger(&rename, &ledgers()));
    }

    #[test]
    fn other_files_are_ignored() {
        let sibling = event(EventKind::Create(CreateKind::File), &["/data/notes.txt"]);
        assert!(!touches_ledger(&sibling, &ledgers()));

        let nested = event(EventKind::Modify(ModifyKind::Any), &["/data/old/banco.csv"]);
        assert!(!touches_ledger(&nested, &ledgers()));
    }

    #[test]
    fn reads_are_ignored() {
        let read = event(EventKind::Access(AccessKind::Any), &["/data/banco.csv"]);
        assert!(!touches_ledger(&read, &ledgers()));
    }

    #[test]
    fn resolve_ledger_paths() {
        let dir = std::env::temp_dir().join(format!("conciliador-watch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let resolved = resolve_ledger(&dir.join("banco.csv")).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved.file_name().unwrap(), "banco.csv");
        assert_eq!(resolved.parent().unwrap(), std::fs::canonicalize(&dir).unwrap());

        let local = resolve_ledger(Path::new("banco.csv")).unwrap();
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
        assert_eq!(local, cwd.join("banco.csv"));

        assert!(resolve_ledger(&dir.join("missing").join("banco.csv")).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
