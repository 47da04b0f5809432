use super::error::EngineError;
use super::moves::{Operator, TrialContext, TrialMove};
use crate::core::models::conformation::Conformation;

/// An ordered list of operators applied as one composite trial move.
#[derive(Debug, Clone, Default)]
pub struct TrialSequence {
    operators: Vec<Operator>,
}

impl TrialSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operator: impl Into<Operator>) {
        self.operators.push(operator.into());
    }

    pub fn with(mut self, operator: impl Into<Operator>) -> Self {
        self.push(operator);
        self
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Applies every operator in declared order; the first failure stops the sequence.
    pub fn apply(
        &self,
        state: &mut Conformation,
        ctx: &mut TrialContext<'_>,
    ) -> Result<(), EngineError> {
        for operator in &self.operators {
            operator.apply(state, ctx)?;
        }
        Ok(())
    }
}

impl FromIterator<Operator> for TrialSequence {
    fn from_iter<I: IntoIterator<Item = Operator>>(iter: I) -> Self {
        Self {
            operators: iter.into_iter().collect(),
        }
    }
}
