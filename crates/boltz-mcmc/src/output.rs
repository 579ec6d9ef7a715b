use std::fs::{self, File};
use std::path::{Path, PathBuf};

use boltz_core::BoltzError;

use crate::replicate::ReplicateRecord;

/// Appends [`ReplicateRecord`] rows to a CSV file with a header line.
pub struct ResultsWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl ResultsWriter {
    /// Creates (or truncates) the results file at `path`.
    pub fn create(path: &Path) -> Result<Self, BoltzError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| BoltzError::io("results-mkdir", err, parent.display()))?;
        }
        let writer = csv::Writer::from_path(path)
            .map_err(|err| BoltzError::io("results-create", err, path.display()))?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows: 0,
        })
    }

    /// Writes a batch of records and flushes, so completed batches survive a
    /// later failure.
    pub fn write_records(&mut self, records: &[ReplicateRecord]) -> Result<(), BoltzError> {
        for record in records {
            self.writer
                .serialize(record)
                .map_err(|err| BoltzError::io("results-write", err, self.path.display()))?;
        }
        self.rows += records.len();
        self.writer
            .flush()
            .map_err(|err| BoltzError::io("results-flush", err, self.path.display()))
    }

    /// Rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Path of the results file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads a results file written by [`ResultsWriter`].
pub fn read_results(path: &Path) -> Result<Vec<ReplicateRecord>, BoltzError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|err| BoltzError::io("results-open", err, path.display()))?;
    reader
        .deserialize()
        .map(|row| row.map_err(|err| BoltzError::io("results-read", err, path.display())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(replicate: usize) -> ReplicateRecord {
        ReplicateRecord {
            beta: 2.5,
            batch: 1,
            replicate,
            seed: 42 + replicate as u64,
            proposal_scale: 0.3,
            acceptance_rate: 0.41,
            observable_estimate: 3.75,
            mean_energy: -12.5,
        }
    }

    #[test]
    fn header_and_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("results.csv");
        let mut writer = ResultsWriter::create(&path).unwrap();
        writer.write_records(&[record(0), record(1)]).unwrap();
        writer.write_records(&[record(2)]).unwrap();
        assert_eq!(writer.rows(), 3);
        assert_eq!(writer.path(), path.as_path());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(
            "beta,batch,replicate,seed,proposal_scale,acceptance_rate,observable_estimate,mean_energy"
        ));
        let rows = read_results(&path).unwrap();
        assert_eq!(rows, vec![record(0), record(1), record(2)]);
    }
}
