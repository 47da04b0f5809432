use crate::core::scoring::term::{ScoreTerms, ScoreWeights};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use thiserror::Error;

/// One row of a score file: the decoy label, its total and the weighted terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub decoy: String,
    pub total_score: f64,
    pub rama: f64,
    pub omega: f64,
    pub rotamer: f64,
    pub chi_pair: f64,
    pub clash: f64,
    pub rmsd: Option<f64>,
}

impl ScoreRecord {
    pub fn new(
        decoy: impl Into<String>,
        total_score: f64,
        terms: &ScoreTerms,
        weights: &ScoreWeights,
        rmsd: Option<f64>,
    ) -> Self {
        let [rama, omega, rotamer, chi_pair, clash] = terms.weighted(weights).map(|(_, v)| v);
        Self {
            decoy: decoy.into(),
            total_score,
            rama,
            omega,
            rotamer,
            chi_pair,
            clash,
            rmsd,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScoreFileError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

/// Appends a record to the score file, writing the header only when the file is new or empty.
pub fn append_record(path: &Path, record: &ScoreRecord) -> Result<(), ScoreFileError> {
    let io_err = |e| ScoreFileError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    };
    let csv_err = |e| ScoreFileError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    };

    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer.serialize(record).map_err(csv_err)?;
    writer.flush().map_err(io_err)?;
    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<ScoreRecord>, ScoreFileError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| ScoreFileError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    reader
        .deserialize::<ScoreRecord>()
        .map(|result| {
            result.map_err(|e| ScoreFileError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })
        })
        .collect()
}
