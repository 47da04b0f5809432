use super::{TrialContext, TrialMove};
use crate::core::geometry::wrap_degrees;
use crate::core::models::conformation::Conformation;
use crate::core::models::movemap::MoveMap;
use crate::core::models::residue::Torsion;
use crate::core::scoring::potentials::rama_energy;
use crate::engine::config::DEFAULT_ANGLE_MAX;
use crate::engine::error::EngineError;
use crate::engine::metropolis::metropolis_accept;
use rand::Rng;
use rand::rngs::StdRng;
use tracing::trace;

/// Uniform draw in `[-angle_max / 2, angle_max / 2)`.
fn random_delta(angle_max: f64, rng: &mut StdRng) -> f64 {
    angle_max * (rng.r#gen::<f64>() - 0.5)
}

fn torsion(state: &Conformation, index: usize, torsion: Torsion) -> Result<f64, EngineError> {
    state.torsion(index, torsion).ok_or_else(|| {
        EngineError::Internal(format!("residue {index} has no torsion {torsion}"))
    })
}

/// Perturbs phi and psi of randomly chosen free residues.
///
/// Each perturbation is kept only if it passes a Metropolis test on the local
/// Ramachandran energy at the mover's own temperature.
#[derive(Debug, Clone)]
pub struct SmallMover {
    movemap: MoveMap,
    temperature: f64,
    moves: usize,
    angle_max: f64,
}

impl SmallMover {
    pub fn new(movemap: MoveMap, temperature: f64, moves: usize) -> Self {
        Self {
            movemap,
            temperature,
            moves,
            angle_max: DEFAULT_ANGLE_MAX,
        }
    }

    pub fn with_angle_max(mut self, angle_max: f64) -> Self {
        self.angle_max = angle_max;
        self
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn angle_max(&self) -> f64 {
        self.angle_max
    }
}

impl TrialMove for SmallMover {
    fn name(&self) -> &'static str {
        "small"
    }

    fn apply(
        &self,
        state: &mut Conformation,
        ctx: &mut TrialContext<'_>,
    ) -> Result<(), EngineError> {
        let candidates = self.movemap.free_backbone_residues(state);
        if candidates.is_empty() {
            return Ok(());
        }

        let mut kept = 0;
        for _ in 0..self.moves {
            let i = candidates[ctx.rng.gen_range(0..candidates.len())];
            let old_phi = torsion(state, i, Torsion::Phi)?;
            let old_psi = torsion(state, i, Torsion::Psi)?;
            let new_phi = wrap_degrees(old_phi + random_delta(self.angle_max, ctx.rng));
            let new_psi = wrap_degrees(old_psi + random_delta(self.angle_max, ctx.rng));

            let delta = rama_energy(new_phi, new_psi) - rama_energy(old_phi, old_psi);
            if metropolis_accept(delta, self.temperature, &mut *ctx.rng) {
                state.set_torsion(i, Torsion::Phi, new_phi);
                state.set_torsion(i, Torsion::Psi, new_psi);
                kept += 1;
            }
        }
        trace!(kept, attempted = self.moves, "Small moves applied.");
        Ok(())
    }
}

/// Shears the backbone: `phi(i) += d` and `psi(i - 1) -= d`, keeping the downstream
/// chain direction roughly fixed.
///
/// Requires both residue `i` and its predecessor to be free. Each shear passes a
/// Metropolis test on the Ramachandran energy of the two residues it touches.
#[derive(Debug, Clone)]
pub struct ShearMover {
    movemap: MoveMap,
    temperature: f64,
    moves: usize,
    angle_max: f64,
}

impl ShearMover {
    pub fn new(movemap: MoveMap, temperature: f64, moves: usize) -> Self {
        Self {
            movemap,
            temperature,
            moves,
            angle_max: DEFAULT_ANGLE_MAX,
        }
    }

    pub fn with_angle_max(mut self, angle_max: f64) -> Self {
        self.angle_max = angle_max;
        self
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn angle_max(&self) -> f64 {
        self.angle_max
    }

    fn eligible_residues(&self, state: &Conformation) -> Vec<usize> {
        (1..state.len())
            .filter(|&i| self.movemap.is_bb_free(i) && self.movemap.is_bb_free(i - 1))
            .collect()
    }
}

impl TrialMove for ShearMover {
    fn name(&self) -> &'static str {
        "shear"
    }

    fn apply(
        &self,
        state: &mut Conformation,
        ctx: &mut TrialContext<'_>,
    ) -> Result<(), EngineError> {
        let candidates = self.eligible_residues(state);
        if candidates.is_empty() {
            return Ok(());
        }

        let mut kept = 0;
        for _ in 0..self.moves {
            let i = candidates[ctx.rng.gen_range(0..candidates.len())];
            let prev = i - 1;
            let d = random_delta(self.angle_max, ctx.rng);

            let phi_i = torsion(state, i, Torsion::Phi)?;
            let psi_i = torsion(state, i, Torsion::Psi)?;
            let phi_prev = torsion(state, prev, Torsion::Phi)?;
            let psi_prev = torsion(state, prev, Torsion::Psi)?;
            let new_phi_i = wrap_degrees(phi_i + d);
            let new_psi_prev = wrap_degrees(psi_prev - d);

            let old_energy = rama_energy(phi_i, psi_i) + rama_energy(phi_prev, psi_prev);
            let new_energy =
                rama_energy(new_phi_i, psi_i) + rama_energy(phi_prev, new_psi_prev);
            let delta = new_energy - old_energy;
            if metropolis_accept(delta, self.temperature, &mut *ctx.rng) {
                state.set_torsion(i, Torsion::Phi, new_phi_i);
                state.set_torsion(prev, Torsion::Psi, new_psi_prev);
                kept += 1;
            }
        }
        trace!(kept, attempted = self.moves, "Shear moves applied.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::angle_difference;
    use crate::engine::moves::test_support::{QuadraticScorer, peptide};
    use rand::SeedableRng;

    fn apply(mover: &impl TrialMove, state: &mut Conformation, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ctx = TrialContext::new(&mut rng, &QuadraticScorer);
        mover.apply(state, &mut ctx).unwrap();
    }

    fn max_backbone_change(a: &Conformation, b: &Conformation) -> f64 {
        a.residues()
            .iter()
            .zip(b.residues())
            .flat_map(|(x, y)| {
                [
                    angle_difference(x.phi, y.phi).abs(),
                    angle_difference(x.psi, y.psi).abs(),
                ]
            })
            .fold(0.0, f64::max)
    }

    #[test]
    fn small_mover_perturbs_only_backbone_torsions() {
        let start = peptide(6);
        let mut state = start.clone();
        let mover = SmallMover::new(MoveMap::backbone(), 1e6, 50).with_angle_max(10.0);
        apply(&mover, &mut state, 3);

        assert_ne!(state, start);
        for (a, b) in state.residues().iter().zip(start.residues()) {
            assert_eq!(a.omega, b.omega);
            assert_eq!(a.chi, b.chi);
        }
    }

    #[test]
    fn single_small_move_stays_within_bounds() {
        let start = peptide(4);
        let mut state = start.clone();
        let mover = SmallMover::new(MoveMap::backbone(), 1e6, 1).with_angle_max(7.0);
        apply(&mover, &mut state, 11);
        assert!(max_backbone_change(&state, &start) <= 3.5 + 1e-9);
    }

    #[test]
    fn small_mover_without_free_residues_is_a_no_op() {
        let start = peptide(4);
        let mut state = start.clone();
        apply(&SmallMover::new(MoveMap::new(), 1.0, 10), &mut state, 5);
        assert_eq!(state, start);
    }

    #[test]
    fn small_mover_respects_per_residue_overrides() {
        let start = peptide(4);
        let mut state = start.clone();
        let mut mm = MoveMap::new();
        mm.set_bb_at(2, true);
        apply(&SmallMover::new(mm, 1e6, 20), &mut state, 9);

        for i in [0, 1, 3] {
            assert_eq!(state.residues()[i], start.residues()[i]);
        }
        assert_ne!(state.residues()[2], start.residues()[2]);
    }

    #[test]
    fn zero_angle_max_leaves_state_unchanged() {
        let start = peptide(4);
        let mut state = start.clone();
        apply(
            &SmallMover::new(MoveMap::backbone(), 1.0, 10).with_angle_max(0.0),
            &mut state,
            1,
        );
        assert_eq!(state, start);
    }

    #[test]
    fn same_seed_gives_same_small_moves() {
        let mover = SmallMover::new(MoveMap::backbone(), 1.0, 5);
        let mut a = peptide(5);
        let mut b = peptide(5);
        apply(&mover, &mut a, 77);
        apply(&mover, &mut b, 77);
        assert_eq!(a, b);
    }

    #[test]
    fn shear_move_is_compensating() {
        let start = peptide(2);
        let mut state = start.clone();
        apply(
            &ShearMover::new(MoveMap::backbone(), 1e6, 1).with_angle_max(6.0),
            &mut state,
            21,
        );

        let d_phi = angle_difference(state.residues()[1].phi, start.residues()[1].phi);
        let d_psi = angle_difference(state.residues()[0].psi, start.residues()[0].psi);
        assert!((d_phi + d_psi).abs() < 1e-9);
        assert!(d_phi.abs() <= 3.0 + 1e-9);
        assert_eq!(state.residues()[0].phi, start.residues()[0].phi);
        assert_eq!(state.residues()[1].psi, start.residues()[1].psi);
    }

    #[test]
    fn shear_needs_a_free_predecessor() {
        let start = peptide(3);
        let mut state = start.clone();
        let mut mm = MoveMap::new();
        mm.set_bb_at(0, true);
        mm.set_bb_at(2, true);
        apply(&ShearMover::new(mm, 1e6, 10), &mut state, 4);
        assert_eq!(state, start);
    }

    #[test]
    fn shear_on_single_residue_is_a_no_op() {
        let start = peptide(1);
        let mut state = start.clone();
        apply(&ShearMover::new(MoveMap::backbone(), 1.0, 5), &mut state, 2);
        assert_eq!(state, start);
    }

    #[test]
    fn zero_temperature_never_raises_rama_energy() {
        let rama_total = |c: &Conformation| -> f64 {
            c.residues().iter().map(|r| rama_energy(r.phi, r.psi)).sum()
        };
        let mut state = peptide(6);
        let before = rama_total(&state);
        apply(&SmallMover::new(MoveMap::backbone(), 0.0, 40), &mut state, 8);
        assert!(rama_total(&state) <= before + 1e-12);
    }
}
