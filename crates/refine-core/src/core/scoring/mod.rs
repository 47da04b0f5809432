//! # Scoring Module
//!
//! Evaluates how favourable a conformation is. Lower scores are better.
//!
//! ## Overview
//!
//! The score is a weighted sum of simple torsion-space terms: backbone basin
//! preference (`rama`), peptide planarity (`omega`), staggered side-chain preference
//! (`rotamer`), eclipsing between neighbouring side chains (`chi_pair`) and a soft
//! repulsion between sequence-distant CA atoms (`clash`). The terms are intentionally
//! simple; the refinement engine only needs the [`function::Scorer`] contract.
//!
//! ## Key Components
//!
//! - [`potentials`] - Pure functions for each energy contribution
//! - [`term`] - The per-term breakdown and its weights
//! - [`function`] - The `Scorer` trait and the default `ScoreFunction`

pub mod function;
pub mod potentials;
pub mod term;
