//! JSON-based scan history.
//!
//! Stores each finished [`ScanReport`] as a separate JSON file named after
//! its run id. Supports lookup by id prefix and recent-first listing.

use crate::config::Paths;
use crate::error::{StorageError, StorageResult};
use crate::report::ScanReport;
use crate::types::RunId;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// JSON file-based scan storage.
pub struct ScanStore {
    scans_dir: PathBuf,
}

impl ScanStore {
    /// Open the store in the default data directory.
    pub fn new() -> StorageResult<Self> {
        let paths = Paths::get()?;
        Self::open(paths.scans_dir())
    }

    /// Open a store rooted at `scans_dir`, creating it if needed.
    pub fn open(scans_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let scans_dir = scans_dir.into();
        fs::create_dir_all(&scans_dir)
            .map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        Ok(Self { scans_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.scans_dir
    }

    /// Save a report, returning the file it was written to.
    pub fn save(&self, report: &ScanReport) -> StorageResult<PathBuf> {
        let file = self.scan_file(&report.id);
        let content = serde_json::to_string_pretty(report)?;

        fs::write(&file, content).map_err(|e| StorageError::SaveFailed(e.to_string()))?;
        debug!(path = %file.display(), "saved scan report");
        Ok(file)
    }

    /// Load a report by ID.
    pub fn load(&self, id: &RunId) -> StorageResult<ScanReport> {
        let file = self.scan_file(id);

        if !file.exists() {
            return Err(StorageError::ScanNotFound(id.to_string()));
        }

        let content =
            fs::read_to_string(&file).map_err(|e| StorageError::LoadFailed(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| StorageError::LoadFailed(e.to_string()))
    }

    /// Find a report by full id or unambiguous id prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> StorageResult<ScanReport> {
        let matches: Vec<_> = self
            .list_ids()?
            .into_iter()
            .filter(|id| id.matches_prefix(prefix))
            .collect();

        match matches.as_slice() {
            [] => Err(StorageError::ScanNotFound(prefix.to_string())),
            [id] => self.load(id),
            _ => Err(StorageError::AmbiguousPrefix {
                prefix: prefix.to_string(),
                matches: matches.len(),
            }),
        }
    }

    /// List all stored run ids, in no particular order.
    pub fn list_ids(&self) -> StorageResult<Vec<RunId>> {
        let mut ids = Vec::new();

        for entry in
            fs::read_dir(&self.scans_dir).map_err(|e| StorageError::DirectoryError(e.to_string()))?
        {
            let entry = entry.map_err(|e| StorageError::DirectoryError(e.to_string()))?;
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    if let Ok(id) = stem.to_string_lossy().parse::<RunId>() {
                        ids.push(id);
                    }
                }
            }
        }

        Ok(ids)
    }

    /// List all readable reports, most recent first.
    pub fn list(&self) -> StorageResult<Vec<ScanReport>> {
        let mut reports = Vec::new();

        for id in self.list_ids()? {
            match self.load(&id) {
                Ok(report) => reports.push(report),
                Err(e) => warn!(id = %id, error = %e, "skipping unreadable scan record"),
            }
        }

        reports.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(reports)
    }

    /// List the `count` most recent reports.
    pub fn list_recent(&self, count: usize) -> StorageResult<Vec<ScanReport>> {
        let mut reports = self.list()?;
        reports.truncate(count);
        Ok(reports)
    }

    fn scan_file(&self, id: &RunId) -> PathBuf {
        self.scans_dir.join(format!("{}.json", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeFailure;
    use crate::report::Aggregator;
    use crate::scanner::{ProbeOutcome, ScanKind};
    use crate::services::PORT_SERVICES;
    use crate::types::Port;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn report(target: &str, minutes_ago: i64) -> ScanReport {
        let mut agg = Aggregator::new(ScanKind::Ports, target, Some(&PORT_SERVICES))
            .started_at(Utc::now() - Duration::minutes(minutes_ago));
        agg.absorb(vec![
            ProbeOutcome::Interesting(Port::new(22).unwrap()),
            ProbeOutcome::NotInteresting(ProbeFailure::Refused),
        ]);
        agg.finish()
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = ScanStore::open(dir.path().join("scans")).unwrap();
        let original = report("10.0.0.1", 0);

        let path = store.save(&original).unwrap();
        assert!(path.starts_with(store.dir()));

        let loaded = store.load(&original.id).unwrap();
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.findings, original.findings);
        assert_eq!(loaded.failures, original.failures);
    }

    #[test]
    fn test_find_by_prefix() {
        let dir = TempDir::new().unwrap();
        let store = ScanStore::open(dir.path()).unwrap();
        let saved = report("box.htb", 0);
        store.save(&saved).unwrap();

        let found = store.find_by_prefix(&saved.id.short()).unwrap();
        assert_eq!(found.id, saved.id);

        let found = store.find_by_prefix(&saved.id.to_string()).unwrap();
        assert_eq!(found.id, saved.id);
    }

    #[test]
    fn test_missing_and_ambiguous_prefix() {
        let dir = TempDir::new().unwrap();
        let store = ScanStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.find_by_prefix("deadbeef"),
            Err(StorageError::ScanNotFound(_))
        ));

        // Every hex id starts with one of these sixteen digits
        for i in 0..17 {
            store.save(&report(&format!("10.0.0.{}", i), i)).unwrap();
        }
        let ambiguous = "0123456789abcdef"
            .chars()
            .map(|c| c.to_string())
            .find(|p| matches!(store.find_by_prefix(p), Err(StorageError::AmbiguousPrefix { .. })));
        assert!(ambiguous.is_some());
    }

    #[test]
    fn test_list_recent_orders_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = ScanStore::open(dir.path()).unwrap();
        store.save(&report("old", 30)).unwrap();
        store.save(&report("new", 1)).unwrap();
        store.save(&report("middle", 10)).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let targets: Vec<String> = store
            .list_recent(2)
            .unwrap()
            .into_iter()
            .map(|r| r.target)
            .collect();
        assert_eq!(targets, vec!["new", "middle"]);
    }
}
