use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use fleet_core::DeviceId;
use tracing::info;

use crate::error::BoxError;
use crate::registry::DeviceRegistry;

/// Column holding device identifiers in a manifest file.
pub const DEVICE_ID_COLUMN: &str = "device_id";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read device manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("registry error: {0}")]
    Registry(BoxError),
}

/// Where the authoritative list of fleet devices comes from.
pub trait ManifestSource {
    /// Raw manifest entries. They may be padded, blank or repeated.
    fn load(&self) -> Result<Vec<String>, ManifestError>;
}

/// A CSV file with a header row. Identifiers are taken from the `device_id`
/// column, or from the first column if there is no such header.
#[derive(Debug, Clone)]
pub struct CsvManifest {
    path: PathBuf,
}

impl CsvManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, source: csv::Error) -> ManifestError {
        ManifestError::Read {
            path: self.path.clone(),
            source,
        }
    }
}

impl ManifestSource for CsvManifest {
    fn load(&self) -> Result<Vec<String>, ManifestError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.read_error(e))?;

        let column = reader
            .headers()
            .map_err(|e| self.read_error(e))?
            .iter()
            .position(|header| header.trim() == DEVICE_ID_COLUMN)
            .unwrap_or(0);

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| self.read_error(e))?;
            if let Some(field) = record.get(column) {
                entries.push(field.to_owned());
            }
        }

        Ok(entries)
    }
}

/// Outcome of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Distinct, non-blank identifiers found in the manifest.
    pub manifest_devices: usize,
    /// Identifiers that were not registered before this run.
    pub added: Vec<DeviceId>,
}

/// Registers every manifest device that the registry does not know yet.
///
/// Entries are trimmed, blanks dropped and duplicates collapsed. Nothing is
/// ever removed from the registry, so running this again with the same
/// manifest changes nothing.
pub async fn reconcile<R, M>(registry: &R, source: &M) -> Result<ReconcileReport, ReconcileError>
where
    R: DeviceRegistry,
    M: ManifestSource + ?Sized,
{
    let manifest: BTreeSet<DeviceId> = source
        .load()?
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(DeviceId::from)
        .collect();

    let known: BTreeSet<DeviceId> = registry
        .list()
        .await
        .map_err(|e| ReconcileError::Registry(Box::new(e)))?
        .into_iter()
        .collect();

    let added: Vec<DeviceId> = manifest.difference(&known).cloned().collect();

    if added.is_empty() {
        info!(manifest_devices = manifest.len(), "No new devices to load from manifest");
    } else {
        registry
            .batch_register(added.clone())
            .await
            .map_err(|e| ReconcileError::Registry(Box::new(e)))?;
        info!(
            manifest_devices = manifest.len(),
            added = added.len(),
            "Loaded new devices from manifest"
        );
    }

    Ok(ReconcileReport {
        manifest_devices: manifest.len(),
        added,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use fleet_core::DeviceId;
    use tempfile::NamedTempFile;

    use crate::registry::DeviceRegistry;
    use crate::registry::memory::InMemoryDeviceRegistry;

    use super::{CsvManifest, ManifestError, ManifestSource, ReconcileError, reconcile};

    struct StaticManifest(Vec<&'static str>);

    impl ManifestSource for StaticManifest {
        fn load(&self) -> Result<Vec<String>, ManifestError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    fn ids(raw: &[&str]) -> Vec<DeviceId> {
        raw.iter().copied().map(DeviceId::from).collect()
    }

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_blank_and_padded_entries() {
        let registry = InMemoryDeviceRegistry::new();
        let manifest = StaticManifest(vec!["A", "B", "", " C ", "A", "   "]);

        let report = reconcile(&registry, &manifest).await.unwrap();

        assert_eq!(report.manifest_devices, 3);
        assert_eq!(report.added, ids(&["A", "B", "C"]));
        assert_eq!(registry.list().await.unwrap(), ids(&["A", "B", "C"]));
    }

    #[tokio::test]
    async fn test_rerun_is_a_no_op() {
        let registry = InMemoryDeviceRegistry::new();
        let manifest = StaticManifest(vec!["A", "B", "", " C "]);

        reconcile(&registry, &manifest).await.unwrap();
        let report = reconcile(&registry, &manifest).await.unwrap();

        assert!(report.added.is_empty());
        assert_eq!(registry.list().await.unwrap(), ids(&["A", "B", "C"]));
    }

    #[tokio::test]
    async fn test_existing_devices_are_kept() {
        let registry = InMemoryDeviceRegistry::new();
        registry.batch_register(ids(&["legacy", "B"])).await.unwrap();

        let report = reconcile(&registry, &StaticManifest(vec!["B", "new"]))
            .await
            .unwrap();

        assert_eq!(report.added, ids(&["new"]));
        assert_eq!(registry.list().await.unwrap(), ids(&["B", "legacy", "new"]));
    }

    #[test]
    fn test_csv_device_id_column() {
        let file = csv_file("name,device_id\nfront door, 60-6b-44-84-dc-64 \nlobby,\nback,b4-45-52-a2-f1-3c\n");

        let entries = CsvManifest::new(file.path()).load().unwrap();
        assert_eq!(entries, vec![" 60-6b-44-84-dc-64 ", "", "b4-45-52-a2-f1-3c"]);
    }

    #[test]
    fn test_csv_falls_back_to_first_column() {
        let file = csv_file("id\nalpha\nbeta\n");

        let entries = CsvManifest::new(file.path()).load().unwrap();
        assert_eq!(entries, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_non_utf8_manifest_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"device_id\nalpha\n\xff\xfe\x80\n").unwrap();
        file.flush().unwrap();
        let registry = InMemoryDeviceRegistry::new();
        let manifest = CsvManifest::new(file.path());

        assert!(matches!(manifest.load(), Err(ManifestError::Read { .. })));

        let result = reconcile(&registry, &manifest).await;
        assert!(matches!(result, Err(ReconcileError::Manifest(_))));
        assert!(registry.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_manifest_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let registry = InMemoryDeviceRegistry::new();
        let manifest = CsvManifest::new(dir.path().join("devices.csv"));

        let result = reconcile(&registry, &manifest).await;

        assert!(matches!(result, Err(ReconcileError::Manifest(_))));
        assert!(registry.list().await.unwrap().is_empty());
    }
}
