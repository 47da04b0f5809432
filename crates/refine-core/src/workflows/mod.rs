//! # Workflows Module
//!
//! High-level entry points that drive complete refinements.
//!
//! - **Refinement Workflow** ([`refine`]) - Scores a reference structure, runs a number of
//!   independent Monte Carlo trajectories from it and persists the best decoy of each.

pub mod refine;
