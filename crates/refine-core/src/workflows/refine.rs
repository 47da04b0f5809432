use crate::core::geometry::ca_rmsd;
use crate::core::models::conformation::Conformation;
use crate::core::scoring::function::Scorer;
use crate::engine::config::{ExecutionMode, RefinementConfig};
use crate::engine::context::RefinementContext;
use crate::engine::error::EngineError;
use crate::engine::metropolis::MetropolisGate;
use crate::engine::moves::{ObserverSink, TrialContext};
use crate::engine::output::OutputWriter;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::protocol::RefinementProtocol;
use crate::engine::state::{RefinementResult, RunRecord};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs the standard refinement protocol built from `config`.
///
/// The reference is scored and observed first; then every run starts from a fresh copy
/// of it, refines it with a fresh gate, and hands its best state to `writer`. The first
/// error from any collaborator aborts the whole refinement.
#[instrument(skip_all, name = "refinement_workflow")]
pub fn run(
    reference: &Conformation,
    config: &RefinementConfig,
    scorer: &dyn Scorer,
    observer: Arc<dyn ObserverSink>,
    writer: &mut dyn OutputWriter,
    reporter: &ProgressReporter,
) -> Result<RefinementResult, EngineError> {
    let protocol = RefinementProtocol::from_config(config, Some(observer.clone()));
    let context = RefinementContext::new(reference, config, scorer, observer.as_ref(), reporter);
    run_protocol(&context, &protocol, writer)
}

/// Like [`run`], but with a caller-assembled protocol.
pub fn run_protocol(
    context: &RefinementContext,
    protocol: &RefinementProtocol,
    writer: &mut dyn OutputWriter,
) -> Result<RefinementResult, EngineError> {
    let reference_record = score_reference(context)?;
    let mut records = vec![reference_record];

    let total = context.config.protocol.runs;
    if total == 0 {
        info!("No runs requested; returning the reference score only.");
        return Ok(RefinementResult { records });
    }

    context.reporter.report(Progress::PhaseStart { name: "Refinement" });
    info!(
        runs = total,
        cycles = context.config.protocol.cycles,
        temperature = protocol.temperature(),
        mode = %context.config.protocol.execution,
        "Starting refinement runs."
    );

    match context.config.protocol.execution {
        ExecutionMode::Sequential => {
            let mut rng = StdRng::seed_from_u64(context.config.protocol.seed);
            for index in 1..=total {
                let record = refine_one(context, protocol, index, &mut rng, context.reporter)?;
                writer.write_decoy(&record)?;
                records.push(record);
            }
        }
        ExecutionMode::Parallel => {
            for record in refine_independent(context, protocol)? {
                writer.write_decoy(&record)?;
                records.push(record);
            }
        }
    }

    context.reporter.report(Progress::PhaseFinish);
    let result = RefinementResult { records };
    if let Some(best) = result.best() {
        info!(label = %best.label, score = best.score, "Refinement complete.");
    }
    Ok(result)
}

fn score_reference(context: &RefinementContext) -> Result<RunRecord, EngineError> {
    context.reporter.report(Progress::PhaseStart {
        name: "Scoring Reference",
    });
    let reference = context.reference;
    let score = context.scorer.score(reference)?;
    context
        .observer
        .observe(reference.name(), reference, Some(score))?;
    info!(name = reference.name(), score, "Reference structure scored.");
    context.reporter.report(Progress::PhaseFinish);
    Ok(RunRecord::reference(reference.clone(), score))
}

/// Per-run seeds for parallel execution, drawn in order from a stream seeded with `seed`.
///
/// Drawing instead of offsetting keeps neighbouring master seeds from sharing runs.
pub fn run_seeds(seed: u64, total: usize) -> Vec<u64> {
    let mut master = StdRng::seed_from_u64(seed);
    (0..total).map(|_| master.next_u64()).collect()
}

/// Every run gets its own stream from [`run_seeds`], so results do not depend on
/// scheduling.
fn refine_independent(
    context: &RefinementContext,
    protocol: &RefinementProtocol,
) -> Result<Vec<RunRecord>, EngineError> {
    let seeds = run_seeds(context.config.protocol.seed, context.config.protocol.runs);
    // Cycle-level events from concurrent runs would interleave; only run events are reported.
    let quiet = ProgressReporter::new();

    let refine = |(offset, seed): (usize, u64)| {
        let mut rng = StdRng::seed_from_u64(seed);
        refine_one(context, protocol, offset + 1, &mut rng, &quiet)
    };

    #[cfg(not(feature = "parallel"))]
    let iterator = seeds.into_iter().enumerate();

    #[cfg(feature = "parallel")]
    let iterator = seeds.into_par_iter().enumerate();

    iterator.map(refine).collect()
}

fn refine_one(
    context: &RefinementContext,
    protocol: &RefinementProtocol,
    index: usize,
    rng: &mut StdRng,
    cycle_reporter: &ProgressReporter,
) -> Result<RunRecord, EngineError> {
    let total = context.config.protocol.runs;
    context.reporter.report(Progress::RunStart { index, total });

    let label = context.run_label(index);
    let mut working = context.reference.clone();
    working.set_name(label.as_str());

    let start_score = context.scorer.score(&working)?;
    let mut gate = MetropolisGate::new(&working, start_score, protocol.temperature());
    debug!(run = index, label = %label, start_score, "Run started.");

    let mut trial_context = TrialContext::new(rng, context.scorer);
    protocol
        .repeat()
        .apply(&mut working, &mut gate, &mut trial_context, cycle_reporter)?;

    let counters = gate.counters();
    let (best, score) = gate.into_best();
    context
        .observer
        .observe(&format!("{label}_final"), &best, Some(score))?;

    let rmsd = ca_rmsd(context.reference, &best);
    info!(run = index, score, rmsd, %counters, "Run finished.");
    context.reporter.report(Progress::RunFinish { index, score });

    Ok(RunRecord {
        index,
        label,
        score,
        rmsd,
        state: best,
        counters: Some(counters),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::Residue;
    use crate::core::scoring::function::{ScoreFunction, ScoringError};
    use crate::engine::config::{RefinementConfigBuilder, RejectionPolicy};
    use crate::engine::moves::observe::test_support::RecordingSink;
    use crate::engine::moves::test_support::{FailingMove, QuadraticScorer};
    use crate::engine::moves::{Operator, TracingSink};
    use crate::engine::repeat::RepeatMover;
    use crate::engine::sequence::TrialSequence;
    use crate::engine::trial::TrialMover;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MemoryWriter {
        written: Vec<RunRecord>,
    }

    impl OutputWriter for MemoryWriter {
        fn write_decoy(&mut self, record: &RunRecord) -> Result<(), EngineError> {
            self.written.push(record.clone());
            Ok(())
        }
    }

    /// Counts every evaluation; fails once `fail_after` evaluations have happened.
    struct CountingScorer {
        inner: ScoreFunction,
        calls: AtomicUsize,
        fail_after: Option<usize>,
    }

    impl CountingScorer {
        fn new(fail_after: Option<usize>) -> Self {
            Self {
                inner: ScoreFunction::default(),
                calls: AtomicUsize::new(0),
                fail_after,
            }
        }
    }

    impl Scorer for CountingScorer {
        fn score(&self, conformation: &Conformation) -> Result<f64, ScoringError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_after.is_some_and(|limit| n >= limit) {
                return Err(ScoringError::NonFinite {
                    name: conformation.name().to_string(),
                    value: f64::NAN,
                });
            }
            self.inner.score(conformation)
        }
    }

    fn reference() -> Conformation {
        Conformation::new(
            "input",
            vec![
                Residue::new("ALA", -80.0, -20.0),
                Residue::new("SER", -70.0, 140.0).with_chi(vec![20.0]),
                Residue::new("VAL", -100.0, 110.0).with_chi(vec![-10.0]),
                Residue::new("LEU", -50.0, -60.0).with_chi(vec![170.0, 40.0]),
                Residue::new("GLY", 70.0, 30.0),
                Residue::new("LYS", -65.0, -35.0),
            ],
        )
    }

    fn config() -> RefinementConfigBuilder {
        RefinementConfigBuilder::new().cycles(3).seed(1_111_111)
    }

    fn refine(
        reference: &Conformation,
        config: &RefinementConfig,
        scorer: &dyn Scorer,
    ) -> (RefinementResult, MemoryWriter) {
        let mut writer = MemoryWriter::default();
        let result = run(
            reference,
            config,
            scorer,
            Arc::new(TracingSink),
            &mut writer,
            &ProgressReporter::new(),
        )
        .unwrap();
        (result, writer)
    }

    #[test]
    fn default_protocol_produces_reference_plus_one_record() {
        let reference = reference();
        let config = RefinementConfigBuilder::new().build().unwrap();
        let sf = ScoreFunction::default();
        let (result, writer) = refine(&reference, &config, &sf);

        let scores = result.scores();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0], sf.score(&reference).unwrap());
        assert!(scores[1] <= scores[0]);
        assert_eq!(writer.written.len(), 1);
        assert_eq!(writer.written[0].label, "refine_output_1");
        assert_eq!(writer.written[0].state.name(), "refine_output_1");
    }

    #[test]
    fn record_count_is_runs_plus_one() {
        let reference = reference();
        let sf = ScoreFunction::default();
        for runs in [1, 2, 4] {
            let config = config().runs(runs).build().unwrap();
            let (result, writer) = refine(&reference, &config, &sf);
            assert_eq!(result.scores().len(), runs + 1);
            assert_eq!(writer.written.len(), runs);
            let indices: Vec<_> = result.records.iter().map(|r| r.index).collect();
            assert_eq!(indices, (0..=runs).collect::<Vec<_>>());
        }
    }

    #[test]
    fn zero_runs_scores_reference_only_and_writes_nothing() {
        let reference = reference();
        let scorer = CountingScorer::new(None);
        let config = config().runs(0).build().unwrap();
        let (result, writer) = refine(&reference, &config, &scorer);

        assert_eq!(result.records.len(), 1);
        assert!(writer.written.is_empty());
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reference_is_left_untouched() {
        let reference = reference();
        let snapshot = reference.clone();
        let config = config().runs(2).build().unwrap();
        let (result, _) = refine(&reference, &config, &ScoreFunction::default());

        assert_eq!(reference, snapshot);
        assert_eq!(result.reference().unwrap().state, snapshot);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let reference = reference();
        let sf = ScoreFunction::default();
        let config = config().runs(3).build().unwrap();
        let (first, _) = refine(&reference, &config, &sf);
        let (second, _) = refine(&reference, &config, &sf);

        assert_eq!(first, second);
        let counters: Vec<_> = first.runs().iter().map(|r| r.counters).collect();
        let again: Vec<_> = second.runs().iter().map(|r| r.counters).collect();
        assert_eq!(counters, again);
    }

    #[test]
    fn every_run_best_is_at_most_reference_score() {
        let reference = reference();
        let sf = ScoreFunction::default();
        for policy in [RejectionPolicy::Revert, RejectionPolicy::Drift] {
            let config = config()
                .runs(3)
                .temperature(5.0)
                .rejection_policy(policy)
                .build()
                .unwrap();
            let (result, _) = refine(&reference, &config, &sf);
            let reference_score = result.scores()[0];
            for record in result.runs() {
                assert!(record.score <= reference_score);
                assert_eq!(record.score, sf.score(&record.state).unwrap());
            }
        }
    }

    #[test]
    fn zero_temperature_only_improves() {
        let reference = reference();
        let sf = ScoreFunction::default();
        let config = config().runs(2).temperature(0.0).build().unwrap();
        let (result, _) = refine(&reference, &config, &sf);

        for record in result.runs() {
            let counters = record.counters.unwrap();
            assert_eq!(counters.accepted, counters.improved);
            assert_eq!(counters.trials, 3);
        }
    }

    #[test]
    fn gate_trials_equal_cycles_in_every_run() {
        let reference = reference();
        let config = config().runs(2).cycles(5).build().unwrap();
        let (result, _) = refine(&reference, &config, &ScoreFunction::default());
        for record in result.runs() {
            assert_eq!(record.counters.unwrap().trials, 5);
        }
    }

    #[test]
    fn parallel_mode_is_reproducible_and_ordered() {
        let reference = reference();
        let sf = ScoreFunction::default();
        let config = config()
            .runs(4)
            .execution(ExecutionMode::Parallel)
            .build()
            .unwrap();
        let (first, writer) = refine(&reference, &config, &sf);
        let (second, _) = refine(&reference, &config, &sf);

        assert_eq!(first, second);
        let labels: Vec<_> = writer.written.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "refine_output_1",
                "refine_output_2",
                "refine_output_3",
                "refine_output_4",
            ]
        );
    }

    #[test]
    fn parallel_runs_match_individually_seeded_sequential_runs() {
        let reference = reference();
        let sf = ScoreFunction::default();
        let parallel = config()
            .runs(2)
            .seed(10)
            .execution(ExecutionMode::Parallel)
            .build()
            .unwrap();
        let (result, _) = refine(&reference, &parallel, &sf);

        let seeds = run_seeds(10, 2);
        for (record, seed) in result.runs().iter().zip(seeds) {
            let single = config().runs(1).seed(seed).build().unwrap();
            let (expected, _) = refine(&reference, &single, &sf);
            assert_eq!(record.score, expected.runs()[0].score);
            assert_eq!(record.state.residues(), expected.runs()[0].state.residues());
        }
    }

    #[test]
    fn run_seeds_do_not_shift_with_neighbouring_master_seeds() {
        let a = run_seeds(10, 4);
        let b = run_seeds(11, 4);
        assert_eq!(a.len(), 4);
        assert_eq!(a, run_seeds(10, 4));
        assert_ne!(a[1..], b[..3]);
        assert!(a.iter().all(|seed| !b.contains(seed)));
    }

    #[test]
    fn observer_sees_reference_trials_and_final_states_by_name() {
        let reference = reference();
        let sink = Arc::new(RecordingSink::default());
        let config = config().runs(2).cycles(2).build().unwrap();
        let mut writer = MemoryWriter::default();
        run(
            &reference,
            &config,
            &ScoreFunction::default(),
            sink.clone(),
            &mut writer,
            &ProgressReporter::new(),
        )
        .unwrap();

        let names = sink.names();
        assert_eq!(
            names,
            vec![
                "input",
                "refine_output_1",
                "refine_output_1",
                "refine_output_1_final",
                "refine_output_2",
                "refine_output_2",
                "refine_output_2_final",
            ]
        );
    }

    #[test]
    fn scoring_failure_aborts_without_writing_further_decoys() {
        let reference = reference();
        let scorer = CountingScorer::new(Some(1));
        let config = config().runs(3).build().unwrap();
        let mut writer = MemoryWriter::default();
        let result = run(
            &reference,
            &config,
            &scorer,
            Arc::new(TracingSink),
            &mut writer,
            &ProgressReporter::new(),
        );

        assert!(matches!(result, Err(EngineError::Scoring { .. })));
        assert!(writer.written.is_empty());
    }

    #[test]
    fn operator_failure_aborts_the_whole_refinement() {
        let reference = reference();
        let config = config().runs(2).build().unwrap();
        let sf = ScoreFunction::default();
        let reporter = ProgressReporter::new();
        let context = RefinementContext::new(&reference, &config, &sf, &TracingSink, &reporter);
        let trial = TrialMover::new(
            TrialSequence::new().with(Operator::Custom(Arc::new(FailingMove))),
            RejectionPolicy::Revert,
        );
        let protocol = RefinementProtocol::new(RepeatMover::new(trial, 3), 1.0);
        let mut writer = MemoryWriter::default();

        let result = run_protocol(&context, &protocol, &mut writer);

        assert!(matches!(result, Err(EngineError::Operator { .. })));
        assert!(writer.written.is_empty());
    }

    #[test]
    fn custom_protocol_runs_with_quadratic_scorer() {
        let reference = reference();
        let config = config().runs(1).build().unwrap();
        let reporter = ProgressReporter::new();
        let context =
            RefinementContext::new(&reference, &config, &QuadraticScorer, &TracingSink, &reporter);
        let protocol = RefinementProtocol::new(
            RepeatMover::new(TrialMover::new(TrialSequence::new(), RejectionPolicy::Revert), 2),
            1.0,
        );
        let mut writer = MemoryWriter::default();

        let result = run_protocol(&context, &protocol, &mut writer).unwrap();

        assert_eq!(result.scores()[0], result.scores()[1]);
        assert_eq!(result.runs()[0].rmsd.map(|r| r < 1e-6), Some(true));
    }

    #[test]
    fn progress_reports_run_boundaries() {
        let reference = reference();
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::RunStart { index, total } = event {
                events.lock().unwrap().push((index, total));
            }
        }));
        let config = config().runs(2).build().unwrap();
        let mut writer = MemoryWriter::default();
        run(
            &reference,
            &config,
            &ScoreFunction::default(),
            Arc::new(TracingSink),
            &mut writer,
            &reporter,
        )
        .unwrap();
        drop(reporter);

        assert_eq!(events.into_inner().unwrap(), vec![(1, 2), (2, 2)]);
    }
}
