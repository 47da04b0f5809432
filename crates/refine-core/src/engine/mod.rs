//! # Engine Module
//!
//! The stateful Monte Carlo control harness built on top of [`crate::core`].
//!
//! ## Overview
//!
//! A refinement trial is an ordered [`sequence::TrialSequence`] of operators applied to a
//! working conformation. The [`trial::TrialMover`] scores the result and asks the
//! [`metropolis::MetropolisGate`] whether to keep it; the [`repeat::RepeatMover`] runs that
//! trial a fixed number of cycles. The gate remembers the lowest-scoring state it has seen,
//! which is what a run ultimately reports.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Sampling, protocol, minimizer and packer settings
//! - **Operators** ([`moves`]) - Backbone perturbers, minimizer, packer and observer
//! - **Acceptance** ([`metropolis`]) - The Metropolis criterion and the best-state gate
//! - **Composition** ([`sequence`], [`trial`], [`repeat`], [`protocol`]) - From operators to a run
//! - **Results** ([`state`], [`output`]) - Per-run records and decoy persistence
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod config;
pub mod context;
pub mod error;
pub mod metropolis;
pub mod moves;
pub mod output;
pub mod progress;
pub mod protocol;
pub mod repeat;
pub mod sequence;
pub mod state;
pub mod trial;
