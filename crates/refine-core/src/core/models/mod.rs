//! # Core Models Module
//!
//! Data structures describing a protein in torsion space.
//!
//! ## Overview
//!
//! A structure is represented purely by its dihedral angles. Bond lengths and bond
//! angles are held at ideal values and only materialized when coordinates are needed
//! (see [`crate::core::geometry`]). This keeps a full candidate solution small enough
//! to be copied freely, which the refinement engine relies on: every trajectory starts
//! from a deep copy of the reference structure and the acceptance gate snapshots the
//! best state it has seen.
//!
//! ## Key Components
//!
//! - [`residue`] - One residue with its backbone (phi, psi, omega) and side-chain (chi) torsions
//! - [`conformation`] - An ordered chain of residues with a traceable name
//! - [`movemap`] - Which torsions the movers and minimizer are allowed to change
//!
//! ## Usage
//!
//! ```ignore
//! use refinepp::core::models::{conformation::Conformation, residue::Residue};
//!
//! let mut pose = Conformation::new("demo", vec![
//!     Residue::new("ALA", -63.0, -43.0),
//!     Residue::new("SER", -63.0, -43.0).with_chi(vec![60.0]),
//! ]);
//! pose.set_name("demo_1");
//! ```

pub mod conformation;
pub mod movemap;
pub mod residue;
