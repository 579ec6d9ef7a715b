use std::fs::{self, File};
use std::path::{Path, PathBuf};

use boltz_core::{BoltzError, ErrorInfo, Particle};
use serde::{Deserialize, Serialize};

/// Flattened copy of a configuration: `(charge, x, y[, z])` per particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sample step (post burn-in) at which the snapshot was taken.
    pub step: usize,
    /// Number of spatial dimensions per particle.
    pub dimensions: usize,
    /// Row-major `(charge, position...)` values.
    pub values: Vec<f64>,
}

impl Snapshot {
    /// Captures `state` at `step`.
    pub fn capture<const D: usize>(step: usize, state: &[Particle<D>]) -> Self {
        let mut values = Vec::with_capacity(state.len() * (D + 1));
        for particle in state {
            values.push(particle.charge());
            values.extend_from_slice(particle.position());
        }
        Self {
            step,
            dimensions: D,
            values,
        }
    }

    /// Iterates over the per-particle `(charge, position...)` tuples.
    pub fn particles(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.dimensions + 1)
    }
}

/// Destination for raw state snapshots taken at thinned sample steps.
pub trait TraceSink<const D: usize> {
    /// Records the configuration at sample step `step`.
    fn record(&mut self, step: usize, state: &[Particle<D>]) -> Result<(), BoltzError>;
}

/// Keeps every snapshot in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryTrace {
    snapshots: Vec<Snapshot>,
}

impl MemoryTrace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots recorded so far.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }
}

impl<const D: usize> TraceSink<D> for MemoryTrace {
    fn record(&mut self, step: usize, state: &[Particle<D>]) -> Result<(), BoltzError> {
        self.snapshots.push(Snapshot::capture(step, state));
        Ok(())
    }
}

/// Writes one tab-separated row per snapshot: `step`, then the flattened
/// `(charge, position...)` values.
pub struct TsvTrace {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl TsvTrace {
    /// Creates (or truncates) the trace file at `path`.
    pub fn create(path: &Path) -> Result<Self, BoltzError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| BoltzError::io("trace-mkdir", err, parent.display()))?;
        }
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_path(path)
            .map_err(|err| BoltzError::io("trace-create", err, path.display()))?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
        })
    }

    /// Path of the trace file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes buffered rows to disk.
    pub fn flush(&mut self) -> Result<(), BoltzError> {
        self.writer
            .flush()
            .map_err(|err| BoltzError::io("trace-flush", err, self.path.display()))
    }
}

impl<const D: usize> TraceSink<D> for TsvTrace {
    fn record(&mut self, step: usize, state: &[Particle<D>]) -> Result<(), BoltzError> {
        let snapshot = Snapshot::capture(step, state);
        let mut row = Vec::with_capacity(snapshot.values.len() + 1);
        row.push(step.to_string());
        row.extend(snapshot.values.iter().map(f64::to_string));
        self.writer
            .write_record(&row)
            .map_err(|err| BoltzError::io("trace-write", err, self.path.display()))
    }
}

/// Reads a trace written by [`TsvTrace`] back into snapshots.
pub fn read_tsv_trace(path: &Path, dimensions: usize) -> Result<Vec<Snapshot>, BoltzError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|err| BoltzError::io("trace-open", err, path.display()))?;
    let mut snapshots = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|err| BoltzError::io("trace-read", err, path.display()))?;
        let parse_err = |field: &str| {
            BoltzError::Serde(
                ErrorInfo::new("trace-parse", format!("invalid trace field `{field}`"))
                    .with_context("path", path.display().to_string()),
            )
        };
        let mut fields = row.iter();
        let step = fields
            .next()
            .ok_or_else(|| parse_err(""))?
            .parse::<usize>()
            .map_err(|_| parse_err(&row[0]))?;
        let values = fields
            .map(|field| field.parse::<f64>().map_err(|_| parse_err(field)))
            .collect::<Result<Vec<_>, _>>()?;
        snapshots.push(Snapshot {
            step,
            dimensions,
            values,
        });
    }
    Ok(snapshots)
}
