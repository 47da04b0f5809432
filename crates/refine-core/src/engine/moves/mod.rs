//! Trial operators applied inside one Monte Carlo trial.
//!
//! Every operator mutates a [`Conformation`] in place through the [`TrialMove`]
//! capability. Stochastic operators draw from the RNG carried by [`TrialContext`], so a
//! single seed at the top of a run fixes the whole trajectory.

pub mod backbone;
pub mod minimize;
pub mod observe;
pub mod pack;

use crate::core::models::conformation::Conformation;
use crate::core::scoring::function::Scorer;
use crate::engine::error::EngineError;
use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;

pub use backbone::{ShearMover, SmallMover};
pub use minimize::MinMover;
pub use observe::{ObserveMover, ObserverSink, TracingSink};
pub use pack::PackMover;

/// Shared resources handed to every operator of a trial.
pub struct TrialContext<'a> {
    pub rng: &'a mut StdRng,
    pub scorer: &'a dyn Scorer,
}

impl<'a> TrialContext<'a> {
    pub fn new(rng: &'a mut StdRng, scorer: &'a dyn Scorer) -> Self {
        Self { rng, scorer }
    }
}

pub trait TrialMove {
    fn name(&self) -> &'static str;

    fn apply(&self, state: &mut Conformation, ctx: &mut TrialContext<'_>)
    -> Result<(), EngineError>;
}

#[derive(Clone)]
pub enum Operator {
    Small(SmallMover),
    Shear(ShearMover),
    Minimize(MinMover),
    Pack(PackMover),
    Observe(ObserveMover),
    /// A caller-supplied move.
    Custom(Arc<dyn TrialMove + Send + Sync>),
}

impl TrialMove for Operator {
    fn name(&self) -> &'static str {
        match self {
            Operator::Small(m) => m.name(),
            Operator::Shear(m) => m.name(),
            Operator::Minimize(m) => m.name(),
            Operator::Pack(m) => m.name(),
            Operator::Observe(m) => m.name(),
            Operator::Custom(m) => m.name(),
        }
    }

    fn apply(
        &self,
        state: &mut Conformation,
        ctx: &mut TrialContext<'_>,
    ) -> Result<(), EngineError> {
        match self {
            Operator::Small(m) => m.apply(state, ctx),
            Operator::Shear(m) => m.apply(state, ctx),
            Operator::Minimize(m) => m.apply(state, ctx),
            Operator::Pack(m) => m.apply(state, ctx),
            Operator::Observe(m) => m.apply(state, ctx),
            Operator::Custom(m) => m.apply(state, ctx),
        }
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operator({})", self.name())
    }
}

impl From<SmallMover> for Operator {
    fn from(m: SmallMover) -> Self {
        Operator::Small(m)
    }
}

impl From<ShearMover> for Operator {
    fn from(m: ShearMover) -> Self {
        Operator::Shear(m)
    }
}

impl From<MinMover> for Operator {
    fn from(m: MinMover) -> Self {
        Operator::Minimize(m)
    }
}

impl From<PackMover> for Operator {
    fn from(m: PackMover) -> Self {
        Operator::Pack(m)
    }
}

impl From<ObserveMover> for Operator {
    fn from(m: ObserveMover) -> Self {
        Operator::Observe(m)
    }
}
