use super::config::RefinementConfig;
use super::moves::{MinMover, ObserveMover, ObserverSink, PackMover, ShearMover, SmallMover};
use super::repeat::RepeatMover;
use super::sequence::TrialSequence;
use super::trial::TrialMover;
use crate::core::models::movemap::MoveMap;
use std::sync::Arc;

/// The per-run refinement mover: a gated trial repeated a fixed number of cycles,
/// plus the temperature every run's gate is built with.
#[derive(Debug, Clone)]
pub struct RefinementProtocol {
    repeat: RepeatMover,
    temperature: f64,
}

impl RefinementProtocol {
    pub fn new(repeat: RepeatMover, temperature: f64) -> Self {
        Self {
            repeat,
            temperature,
        }
    }

    /// Assembles the standard trial: small moves, shear moves, then the optional
    /// minimization, packing and observation steps, in that order.
    ///
    /// The backbone of every residue is free; packing works on every side chain.
    pub fn from_config(
        config: &RefinementConfig,
        observer: Option<Arc<dyn ObserverSink>>,
    ) -> Self {
        let sampling = &config.sampling;
        let movemap = MoveMap::backbone();

        let mut sequence = TrialSequence::new()
            .with(
                SmallMover::new(movemap.clone(), sampling.temperature, sampling.small_moves)
                    .with_angle_max(sampling.angle_max),
            )
            .with(
                ShearMover::new(movemap.clone(), sampling.temperature, sampling.shear_moves)
                    .with_angle_max(sampling.angle_max),
            );

        if let Some(min) = &config.minimizer {
            sequence.push(
                MinMover::new(movemap)
                    .with_tolerance(min.tolerance)
                    .with_max_iterations(min.max_iterations),
            );
        }
        if let Some(pack) = &config.packer {
            sequence.push(PackMover::default().with_max_passes(pack.max_passes));
        }
        if config.protocol.observe
            && let Some(sink) = observer
        {
            sequence.push(ObserveMover::new(sink));
        }

        let trial = TrialMover::new(sequence, config.protocol.rejection_policy);
        Self::new(
            RepeatMover::new(trial, config.protocol.cycles),
            sampling.temperature,
        )
    }

    pub fn repeat(&self) -> &RepeatMover {
        &self.repeat
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}
