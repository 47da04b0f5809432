use crate::core::models::conformation::Conformation;
use rand::Rng;
use std::fmt;

/// Metropolis criterion for a score change `delta` at temperature `temperature`.
///
/// Downhill moves are always accepted without consuming randomness. Uphill or
/// neutral moves draw one uniform number and pass with probability `exp(-delta/kT)`;
/// a temperature that is zero, negative or NaN rejects them outright.
pub fn metropolis_accept<R: Rng + ?Sized>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    if delta < 0.0 {
        return true;
    }
    if temperature.is_nan() || temperature <= 0.0 {
        return false;
    }
    rng.r#gen::<f64>() < (-delta / temperature).exp()
}

/// Outcome of presenting one candidate to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Strictly better than the best seen so far; the best snapshot was replaced.
    Improved,
    /// Passed the test against the last accepted score without beating the best.
    Accepted,
    Rejected,
}

impl Decision {
    pub fn is_accepted(self) -> bool {
        !matches!(self, Decision::Rejected)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateCounters {
    pub trials: usize,
    pub accepted: usize,
    pub improved: usize,
}

impl GateCounters {
    pub fn acceptance_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.accepted as f64 / self.trials as f64
        }
    }
}

impl fmt::Display for GateCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trials={} accepted={} improved={} accept_rate={:.3}",
            self.trials,
            self.accepted,
            self.improved,
            self.acceptance_rate()
        )
    }
}

/// Acceptance controller for one trajectory.
///
/// Candidates are compared with the last accepted state, which is also what a rejected
/// trial reverts to. The lowest-scoring state is kept apart for [`Self::recover_low`].
/// A gate is built
/// from the starting state of a run, so nothing carries over between runs.
#[derive(Debug, Clone)]
pub struct MetropolisGate {
    temperature: f64,
    best: Conformation,
    best_score: f64,
    last_accepted: Conformation,
    last_accepted_score: f64,
    counters: GateCounters,
}

impl MetropolisGate {
    pub fn new(start: &Conformation, start_score: f64, temperature: f64) -> Self {
        Self {
            temperature,
            best: start.clone(),
            best_score: start_score,
            last_accepted: start.clone(),
            last_accepted_score: start_score,
            counters: GateCounters::default(),
        }
    }

    /// Judges `candidate` against the last accepted score.
    ///
    /// The best snapshot only moves when an accepted candidate also beats it; since every
    /// best state was once accepted, `best_score <= last_accepted_score` always holds.
    pub fn evaluate<R: Rng + ?Sized>(
        &mut self,
        candidate: &Conformation,
        score: f64,
        rng: &mut R,
    ) -> Decision {
        self.counters.trials += 1;
        let delta = score - self.last_accepted_score;

        if !metropolis_accept(delta, self.temperature, rng) {
            return Decision::Rejected;
        }

        self.counters.accepted += 1;
        self.last_accepted.clone_from(candidate);
        self.last_accepted_score = score;

        if score < self.best_score {
            self.counters.improved += 1;
            self.best.clone_from(candidate);
            self.best_score = score;
            Decision::Improved
        } else {
            Decision::Accepted
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    pub fn last_accepted(&self) -> &Conformation {
        &self.last_accepted
    }

    pub fn last_accepted_score(&self) -> f64 {
        self.last_accepted_score
    }

    pub fn counters(&self) -> GateCounters {
        self.counters
    }

    /// The lowest-scoring state seen during this run.
    pub fn recover_low(&self) -> &Conformation {
        &self.best
    }

    pub fn into_best(self) -> (Conformation, f64) {
        (self.best, self.best_score)
    }
}
