use super::load_structure;
use crate::cli::ScoreArgs;
use crate::config::load_weights;
use crate::error::Result;
use refinepp::core::models::conformation::Conformation;
use refinepp::core::scoring::function::{ScoreFunction, Scorer};
use refinepp::core::scoring::term::{ScoreTerms, ScoreWeights};
use refinepp::engine::error::EngineError;
use std::fmt::Write as _;

pub fn run(args: ScoreArgs) -> Result<()> {
    let weights = load_weights(args.config.as_deref())?;
    let conformation = load_structure(&args.input)?;

    let score_function = ScoreFunction::new(weights);
    let total = score_function
        .score(&conformation)
        .map_err(EngineError::from)?;
    let terms = score_function.terms(&conformation);

    print!("{}", format_breakdown(&conformation, &terms, &weights, total));
    Ok(())
}

fn format_breakdown(
    conformation: &Conformation,
    terms: &ScoreTerms,
    weights: &ScoreWeights,
    total: f64,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} residues, {})",
        conformation.name(),
        conformation.len(),
        conformation.sequence()
    );
    for (name, value) in terms.weighted(weights) {
        let _ = writeln!(out, "  {:<10} {:>12.4}", name, value);
    }
    let _ = writeln!(out, "  {:<10} {:>12.4}", "total", total);
    out
}
