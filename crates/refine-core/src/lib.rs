//! # REFINE++ Core Library
//!
//! A compact Monte Carlo refinement harness for protein conformations expressed in
//! torsion space: small and shear backbone perturbations, gradient minimization,
//! rotamer packing and a Metropolis acceptance gate that keeps the best structure
//! seen during each trajectory.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Conformation`, `Residue`,
//!   `MoveMap`), torsion geometry, the scoring function and structure file I/O.
//!
//! - **[`engine`]: The Logic Core.** The stateful control harness. Trial operators,
//!   the ordered `TrialSequence`, the `MetropolisGate`, the gated `TrialMover` and the
//!   fixed-count `RepeatMover`, together with configuration, errors and progress events.
//!
//! - **[`workflows`]: The Public API.** The run manager that drives several independent
//!   trajectories from one reference structure and persists the best decoy of each.

pub mod core;
pub mod engine;
pub mod workflows;
