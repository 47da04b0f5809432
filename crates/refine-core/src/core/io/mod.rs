//! Provides input/output functionality for conformation files.
//!
//! Structures are stored as torsion-space TOML documents ([`conf`]) that round-trip
//! exactly. Backbone PDB files ([`pdb`]) are read by deriving torsions from the N, CA
//! and C atoms and written from the built backbone. Per-decoy scores are appended to a
//! CSV score file ([`scorefile`]).

pub mod conf;
pub mod pdb;
pub mod scorefile;
pub mod traits;
