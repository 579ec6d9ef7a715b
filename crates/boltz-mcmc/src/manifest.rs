use std::fs;
use std::path::{Path, PathBuf};

use boltz_core::errors::ErrorInfo;
use boltz_core::BoltzError;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;

/// Structured manifest describing a completed or running sampling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Configuration used for the run.
    pub config: RunConfig,
    /// Master seed used to derive replicate seeds.
    pub master_seed: u64,
    /// Optional seed label captured from the configuration.
    pub seed_label: Option<String>,
    /// RFC 3339 timestamp taken when the run started.
    pub started_at: String,
    /// RFC 3339 timestamp taken when the run finished.
    pub finished_at: Option<String>,
    /// Results file produced during the run (relative to run directory).
    pub results_file: PathBuf,
    /// Trace directory, when traces were written.
    pub trace_dir: Option<PathBuf>,
    /// Number of result rows written.
    pub records: usize,
}

impl RunManifest {
    /// Starts a manifest for `config`, stamped with the current time.
    pub fn begin(config: &RunConfig) -> Self {
        Self {
            config: config.clone(),
            master_seed: config.seed_policy.master_seed,
            seed_label: config.seed_policy.label.clone(),
            started_at: Utc::now().to_rfc3339(),
            finished_at: None,
            results_file: config.output.results_file.clone(),
            trace_dir: config
                .output
                .trace
                .then(|| config.output.trace_dir.clone()),
            records: 0,
        }
    }

    /// Records the row count and the finishing time.
    pub fn finish(&mut self, records: usize) {
        self.records = records;
        self.finished_at = Some(Utc::now().to_rfc3339());
    }

    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), BoltzError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| BoltzError::io("manifest-mkdir", err, parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            BoltzError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| BoltzError::io("manifest-write", err, path.display()))
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, BoltzError> {
        let contents = fs::read_to_string(path)
            .map_err(|err| BoltzError::io("manifest-read", err, path.display()))?;
        serde_json::from_str(&contents).map_err(|err| {
            BoltzError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RunConfig::default();
        config.seed_policy.label = Some("smoke".into());
        config.output.trace = true;

        let mut manifest = RunManifest::begin(&config);
        assert!(manifest.finished_at.is_none());
        manifest.finish(9);
        let path = dir.path().join("manifest.json");
        manifest.write(&path).unwrap();

        let loaded = RunManifest::load(&path).unwrap();
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.records, 9);
        assert_eq!(loaded.seed_label.as_deref(), Some("smoke"));
        assert_eq!(loaded.trace_dir, Some(PathBuf::from("trace")));
    }

    #[test]
    fn missing_manifest_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RunManifest::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, BoltzError::Io(_)));
    }
}
