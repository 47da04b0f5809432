//! # Core Module
//!
//! Stateless building blocks for torsion-space refinement.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Residues, conformations and move maps
//! - **Geometry** ([`geometry`]) - Angle arithmetic, backbone construction, RMSD
//! - **Scoring** ([`scoring`]) - Torsional potentials and the weighted score function
//! - **File I/O** ([`io`]) - Conformation files, backbone PDB export, score files
//!
//! Nothing in this module holds optimization state; the [`crate::engine`] layer owns
//! working copies of conformations and mutates them.

pub mod geometry;
pub mod io;
pub mod models;
pub mod scoring;
