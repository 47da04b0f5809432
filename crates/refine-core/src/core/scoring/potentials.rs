use crate::core::geometry::angle_difference;

/// A Gaussian well on the Ramachandran map.
#[derive(Debug, Clone, Copy)]
pub struct RamaBasin {
    pub phi: f64,
    pub psi: f64,
    pub width: f64,
    pub depth: f64,
}

/// Right-handed helix, extended strand and left-handed helix basins.
pub const RAMA_BASINS: [RamaBasin; 3] = [
    RamaBasin {
        phi: -63.0,
        psi: -43.0,
        width: 25.0,
        depth: 1.0,
    },
    RamaBasin {
        phi: -120.0,
        psi: 130.0,
        width: 30.0,
        depth: 1.0,
    },
    RamaBasin {
        phi: 57.0,
        psi: 47.0,
        width: 20.0,
        depth: 0.4,
    },
];

#[inline]
pub fn basin_energy(phi: f64, psi: f64, basin: &RamaBasin) -> f64 {
    let dphi = angle_difference(phi, basin.phi);
    let dpsi = angle_difference(psi, basin.psi);
    let r2 = dphi * dphi + dpsi * dpsi;
    -basin.depth * (-r2 / (2.0 * basin.width * basin.width)).exp()
}

/// Backbone torsion preference, zero far from any basin and negative inside one.
#[inline]
pub fn rama_energy(phi: f64, psi: f64) -> f64 {
    RAMA_BASINS.iter().map(|b| basin_energy(phi, psi, b)).sum()
}

/// Zero for a trans peptide bond, one for cis.
#[inline]
pub fn omega_energy(omega: f64) -> f64 {
    0.5 * (1.0 + omega.to_radians().cos())
}

/// Zero at the staggered positions (60, 180, -60), one when eclipsed.
#[inline]
pub fn staggered_energy(chi: f64) -> f64 {
    0.5 * (1.0 + (3.0 * chi.to_radians()).cos())
}

/// Penalty for two neighbouring side chains pointing the same way.
#[inline]
pub fn eclipse_energy(chi_a: f64, chi_b: f64) -> f64 {
    0.5 * (1.0 + (chi_a - chi_b).to_radians().cos())
}

/// Quadratic repulsion below `cutoff`, zero beyond it.
#[inline]
pub fn soft_repulsion(dist: f64, cutoff: f64) -> f64 {
    if dist >= cutoff {
        0.0
    } else {
        let overlap = cutoff - dist;
        overlap * overlap
    }
}
