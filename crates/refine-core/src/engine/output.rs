use super::error::EngineError;
use super::state::RunRecord;
use crate::core::io::conf::ConfFile;
use crate::core::io::pdb::PdbFile;
use crate::core::io::scorefile::{ScoreRecord, append_record};
use crate::core::io::traits::StructureFile;
use crate::core::scoring::function::ScoreFunction;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persists the best state of each run.
pub trait OutputWriter {
    fn write_decoy(&mut self, record: &RunRecord) -> Result<(), EngineError>;
}

/// Writes `<label>.toml` and `<label>.pdb` for every decoy and appends a row to
/// `<prefix>.fasc`, all inside one output directory.
#[derive(Debug, Clone)]
pub struct DecoyWriter {
    dir: PathBuf,
    score_file: PathBuf,
    score_function: ScoreFunction,
}

impl DecoyWriter {
    /// Creates the output directory if needed and starts a fresh score file.
    pub fn create(
        dir: impl Into<PathBuf>,
        prefix: &str,
        score_function: ScoreFunction,
    ) -> Result<Self, EngineError> {
        let dir = dir.into();
        let output_err = |e: std::io::Error| EngineError::Output {
            label: prefix.to_string(),
            message: e.to_string(),
        };

        std::fs::create_dir_all(&dir).map_err(output_err)?;
        let score_file = dir.join(format!("{prefix}.fasc"));
        if score_file.exists() {
            std::fs::remove_file(&score_file).map_err(output_err)?;
        }

        Ok(Self {
            dir,
            score_file,
            score_function,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn score_file(&self) -> &Path {
        &self.score_file
    }
}

impl OutputWriter for DecoyWriter {
    fn write_decoy(&mut self, record: &RunRecord) -> Result<(), EngineError> {
        let output_err = |message: String| EngineError::Output {
            label: record.label.clone(),
            message,
        };

        let conf_path = self.dir.join(format!("{}.toml", record.label));
        ConfFile::write_to_path(&record.state, &conf_path)
            .map_err(|e| output_err(e.to_string()))?;

        let pdb_path = self.dir.join(format!("{}.pdb", record.label));
        PdbFile::write_to_path(&record.state, &pdb_path)
            .map_err(|e| output_err(e.to_string()))?;

        let terms = self.score_function.terms(&record.state);
        let row = ScoreRecord::new(
            record.label.as_str(),
            record.score,
            &terms,
            self.score_function.weights(),
            record.rmsd,
        );
        append_record(&self.score_file, &row).map_err(|e| output_err(e.to_string()))?;

        debug!(label = %record.label, path = %conf_path.display(), "Decoy written.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::scorefile::read_records;
    use crate::core::models::conformation::Conformation;
    use crate::core::models::residue::Residue;
    use crate::core::scoring::function::Scorer;
    use tempfile::tempdir;

    fn record(index: usize) -> RunRecord {
        let mut state = Conformation::new(
            "x",
            vec![
                Residue::new("ALA", -63.0, -43.0),
                Residue::new("SER", -63.0, -43.0).with_chi(vec![60.0]),
            ],
        );
        let label = format!("job_{index}");
        state.set_name(label.clone());
        let score = ScoreFunction::default().score(&state).unwrap();
        RunRecord {
            index,
            label,
            score,
            rmsd: Some(0.0),
            state,
            counters: None,
        }
    }

    #[test]
    fn writes_structure_files_and_one_score_row_per_decoy() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let mut writer = DecoyWriter::create(&out, "job", ScoreFunction::default()).unwrap();

        writer.write_decoy(&record(1)).unwrap();
        writer.write_decoy(&record(2)).unwrap();

        let backbone = PdbFile::read_from_path(out.join("job_1.pdb")).unwrap();
        assert_eq!(backbone.name(), "job_1");
        assert_eq!(backbone.sequence(), record(1).state.sequence());
        let reloaded = ConfFile::read_from_path(out.join("job_2.toml")).unwrap();
        assert_eq!(reloaded, record(2).state);

        let rows = read_records(writer.score_file()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].decoy, "job_1");
        assert_eq!(rows[1].total_score, record(2).score);
    }

    #[test]
    fn score_row_terms_sum_to_total() {
        let dir = tempdir().unwrap();
        let mut writer =
            DecoyWriter::create(dir.path(), "job", ScoreFunction::default()).unwrap();
        writer.write_decoy(&record(1)).unwrap();

        let row = &read_records(writer.score_file()).unwrap()[0];
        let sum = row.rama + row.omega + row.rotamer + row.chi_pair + row.clash;
        assert!((sum - row.total_score).abs() < 1e-9);
    }

    #[test]
    fn create_starts_a_fresh_score_file() {
        let dir = tempdir().unwrap();
        let mut writer =
            DecoyWriter::create(dir.path(), "job", ScoreFunction::default()).unwrap();
        writer.write_decoy(&record(1)).unwrap();

        let writer = DecoyWriter::create(dir.path(), "job", ScoreFunction::default()).unwrap();
        assert!(!writer.score_file().exists());
    }
}
