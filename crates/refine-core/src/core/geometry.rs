use super::models::conformation::Conformation;
use nalgebra::{Matrix3, Point3, Vector3};

/// Ideal backbone geometry (Engh & Huber), lengths in Å and angles in degrees.
pub const N_CA_LENGTH: f64 = 1.458;
pub const CA_C_LENGTH: f64 = 1.525;
pub const C_N_LENGTH: f64 = 1.329;
pub const N_CA_C_ANGLE: f64 = 111.2;
pub const CA_C_N_ANGLE: f64 = 116.2;
pub const C_N_CA_ANGLE: f64 = 121.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackboneAtoms {
    pub n: Point3<f64>,
    pub ca: Point3<f64>,
    pub c: Point3<f64>,
}

/// Wraps an angle in degrees into (-180, 180].
#[inline]
pub fn wrap_degrees(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Signed shortest angular difference `a - b` in degrees.
#[inline]
pub fn angle_difference(a: f64, b: f64) -> f64 {
    wrap_degrees(a - b)
}

/// Dihedral angle p0-p1-p2-p3 in degrees.
pub fn dihedral(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>, p3: &Point3<f64>) -> f64 {
    let b0 = p0 - p1;
    let b1 = (p2 - p1).normalize();
    let b2 = p3 - p2;

    let v = b0 - b1 * b0.dot(&b1);
    let w = b2 - b1 * b2.dot(&b1);

    let x = v.dot(&w);
    let y = b1.cross(&v).dot(&w);
    y.atan2(x).to_degrees()
}

/// Places atom D given A-B-C, the C-D bond length, the B-C-D angle and the A-B-C-D torsion.
pub fn place_atom(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    bond_length: f64,
    bond_angle_degrees: f64,
    torsion_degrees: f64,
) -> Point3<f64> {
    let theta = bond_angle_degrees.to_radians();
    let phi = torsion_degrees.to_radians();

    let bc = (c - b).normalize();
    let n = (b - a).cross(&bc).normalize();
    let m = n.cross(&bc);

    let d2 = Vector3::new(
        -bond_length * theta.cos(),
        bond_length * theta.sin() * phi.cos(),
        bond_length * theta.sin() * phi.sin(),
    );
    c + bc * d2.x + m * d2.y + n * d2.z
}

/// Builds N, CA and C coordinates for every residue from its torsions.
///
/// The first residue is anchored at the origin with N-CA along +x, so two conformations
/// of the same chain share a frame only up to rigid motion; use [`superposed_rmsd`] to
/// compare them.
pub fn build_backbone(conformation: &Conformation) -> Vec<BackboneAtoms> {
    let residues = conformation.residues();
    let mut atoms: Vec<BackboneAtoms> = Vec::with_capacity(residues.len());

    for (i, residue) in residues.iter().enumerate() {
        let placed = match atoms.last() {
            None => {
                let n = Point3::origin();
                let ca = Point3::new(N_CA_LENGTH, 0.0, 0.0);
                let angle = (180.0 - N_CA_C_ANGLE).to_radians();
                let c =
                    ca + Vector3::new(CA_C_LENGTH * angle.cos(), CA_C_LENGTH * angle.sin(), 0.0);
                BackboneAtoms { n, ca, c }
            }
            Some(prev) => {
                let prev_res = &residues[i - 1];
                let n = place_atom(
                    &prev.n,
                    &prev.ca,
                    &prev.c,
                    C_N_LENGTH,
                    CA_C_N_ANGLE,
                    prev_res.psi,
                );
                let ca = place_atom(
                    &prev.ca,
                    &prev.c,
                    &n,
                    N_CA_LENGTH,
                    C_N_CA_ANGLE,
                    prev_res.omega,
                );
                let c = place_atom(&prev.c, &n, &ca, CA_C_LENGTH, N_CA_C_ANGLE, residue.phi);
                BackboneAtoms { n, ca, c }
            }
        };
        atoms.push(placed);
    }
    atoms
}

pub fn ca_trace(conformation: &Conformation) -> Vec<Point3<f64>> {
    build_backbone(conformation).into_iter().map(|a| a.ca).collect()
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

fn centroid(coords: &[Point3<f64>]) -> Point3<f64> {
    let sum = coords
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / coords.len() as f64)
}

/// RMSD after optimal rigid superposition (Kabsch).
pub fn superposed_rmsd(mobile: &[Point3<f64>], target: &[Point3<f64>]) -> Option<f64> {
    if mobile.len() != target.len() || mobile.is_empty() {
        return None;
    }
    let cm = centroid(mobile);
    let ct = centroid(target);

    let mut h = Matrix3::zeros();
    for (p, q) in mobile.iter().zip(target) {
        h += (p - cm) * (q - ct).transpose();
    }

    let svd = h.svd(true, true);
    let u = svd.u?;
    let v = svd.v_t?.transpose();
    let d = if (v * u.transpose()).determinant() < 0.0 {
        -1.0
    } else {
        1.0
    };
    let correction = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, d));
    let rotation = v * correction * u.transpose();

    let moved: Vec<Point3<f64>> = mobile
        .iter()
        .map(|p| ct + rotation * (p - cm))
        .collect();
    calculate_rmsd(&moved, target)
}

/// CA RMSD between two conformations of the same chain after superposition.
pub fn ca_rmsd(a: &Conformation, b: &Conformation) -> Option<f64> {
    superposed_rmsd(&ca_trace(a), &ca_trace(b))
}
