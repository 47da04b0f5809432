use super::load_structure;
use crate::cli::RefineArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use refinepp::{
    core::scoring::function::ScoreFunction,
    engine::{
        moves::{ObserverSink, TracingSink},
        output::DecoyWriter,
        progress::ProgressReporter,
        state::RefinementResult,
    },
    workflows,
};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;

pub fn run(args: RefineArgs) -> Result<()> {
    info!("Merging configuration from defaults, file and CLI arguments...");
    let app_config = build_config(&args)?;
    let config = &app_config.core_config;

    let reference = load_structure(&app_config.input_path)?;
    info!(
        "Loaded '{}' with {} residue(s): {}",
        reference.name(),
        reference.len(),
        reference.sequence()
    );

    let score_function = ScoreFunction::new(config.weights);
    let mut writer = DecoyWriter::create(
        &app_config.output_dir,
        &config.output_prefix,
        score_function.clone(),
    )?;
    let observer: Arc<dyn ObserverSink> = Arc::new(TracingSink);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting refinement: {} run(s) of {} cycle(s) at kT = {}...",
        config.protocol.runs, config.protocol.cycles, config.sampling.temperature
    );
    info!("Invoking the core refinement workflow...");

    let result = workflows::refine::run(
        &reference,
        config,
        &score_function,
        observer,
        &mut writer,
        &reporter,
    )?;

    print!("{}", format_summary(&result));
    if !result.runs().is_empty() {
        println!("Scores written to: {}", writer.score_file().display());
    }

    Ok(())
}

fn format_summary(result: &RefinementResult) -> String {
    let mut out = String::new();
    if let Some(reference) = result.reference() {
        let _ = writeln!(out, "Original Score: {:.4}", reference.score);
    }
    for record in result.runs() {
        let _ = write!(out, "  {} score: {:.4}", record.label, record.score);
        if let Some(rmsd) = record.rmsd {
            let _ = write!(out, "  CA-RMSD: {:.3}", rmsd);
        }
        if let Some(counters) = record.counters {
            let _ = write!(out, "  [{}]", counters);
        }
        out.push('\n');
    }
    if let Some(best) = result.best() {
        let _ = writeln!(out, "✓ Best decoy: {} (score {:.4})", best.label, best.score);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use refinepp::core::io::conf::ConfFile;
    use refinepp::core::io::pdb::PdbFile;
    use refinepp::core::io::scorefile::read_records;
    use refinepp::core::io::traits::StructureFile;
    use refinepp::core::models::conformation::Conformation;
    use refinepp::core::models::residue::Residue;
    use refinepp::engine::state::RunRecord;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_input(dir: &Path) -> std::path::PathBuf {
        let pose = Conformation::new(
            "peptide",
            vec![
                Residue::new("ALA", -80.0, -20.0),
                Residue::new("SER", -70.0, 140.0).with_chi(vec![20.0]),
                Residue::new("VAL", -100.0, 110.0).with_chi(vec![-10.0]),
                Residue::new("GLY", 70.0, 30.0),
            ],
        );
        let path = dir.join("peptide.toml");
        ConfFile::write_to_path(&pose, &path).unwrap();
        path
    }

    fn refine_args(args: &[&str]) -> RefineArgs {
        let mut argv = vec!["refine", "refine"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Commands::Refine(args) => args,
            other => panic!("Expected 'refine' subcommand, got {other:?}"),
        }
    }

    #[test]
    fn refine_writes_one_decoy_per_run() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path());
        let out = dir.path().join("out");
        let args = refine_args(&[
            "-i",
            input.to_str().unwrap(),
            "-d",
            out.to_str().unwrap(),
            "-o",
            "job",
            "--runs",
            "2",
            "--cycles",
            "2",
        ]);

        run(args).unwrap();

        for label in ["job_1", "job_2"] {
            assert!(out.join(format!("{label}.pdb")).is_file());
            let decoy = ConfFile::read_from_path(out.join(format!("{label}.toml"))).unwrap();
            assert_eq!(decoy.name(), label);
        }
        let rows = read_records(&out.join("job.fasc")).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn refine_accepts_pdb_input_and_its_decoys_reload() {
        let dir = tempdir().unwrap();
        let toml_input = write_input(dir.path());
        let pose = ConfFile::read_from_path(&toml_input).unwrap();
        let input = dir.path().join("peptide.pdb");
        PdbFile::write_to_path(&pose, &input).unwrap();
        let out = dir.path().join("out");
        let args = refine_args(&[
            "-i",
            input.to_str().unwrap(),
            "-d",
            out.to_str().unwrap(),
            "-o",
            "job",
            "--runs",
            "1",
            "--cycles",
            "2",
        ]);

        run(args).unwrap();

        let decoy = load_structure(&out.join("job_1.pdb")).unwrap();
        assert_eq!(decoy.name(), "job_1");
        assert_eq!(decoy.sequence(), pose.sequence());
    }

    #[test]
    fn zero_runs_writes_no_decoys() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path());
        let out = dir.path().join("out");
        let args = refine_args(&[
            "-i",
            input.to_str().unwrap(),
            "-d",
            out.to_str().unwrap(),
            "--runs",
            "0",
        ]);

        run(args).unwrap();

        assert!(!out.join("refine_output.fasc").exists());
        assert!(!out.join("refine_output_1.toml").exists());
    }

    #[test]
    fn missing_input_is_a_structure_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let args = refine_args(&["-i", missing.to_str().unwrap()]);
        assert!(matches!(
            run(args),
            Err(crate::error::CliError::Structure { .. })
        ));
    }

    #[test]
    fn summary_lists_reference_and_runs() {
        let reference = Conformation::new("input", vec![Residue::new("ALA", -60.0, -40.0)]);
        let mut decoy = reference.clone();
        decoy.set_name("job_1");
        let result = RefinementResult {
            records: vec![
                RunRecord::reference(reference, 1.5),
                RunRecord {
                    index: 1,
                    label: "job_1".to_string(),
                    score: 0.25,
                    rmsd: Some(0.1),
                    state: decoy,
                    counters: None,
                },
            ],
        };

        let summary = format_summary(&result);
        let lines: Vec<_> = summary.lines().collect();
        assert_eq!(lines[0], "Original Score: 1.5000");
        assert_eq!(lines[1], "  job_1 score: 0.2500  CA-RMSD: 0.100");
        assert_eq!(lines[2], "✓ Best decoy: job_1 (score 0.2500)");
    }
}
