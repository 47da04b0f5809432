pub mod refine;
pub mod score;

use crate::error::{CliError, Result};
use refinepp::core::io::conf::ConfFile;
use refinepp::core::io::pdb::PdbFile;
use refinepp::core::io::traits::StructureFile;
use refinepp::core::models::conformation::Conformation;
use std::path::Path;
use tracing::info;

fn is_pdb(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdb") || ext.eq_ignore_ascii_case("ent"))
}

/// Loads a `.pdb`/`.ent` backbone or, for any other extension, a TOML conformation.
fn load_structure(path: &Path) -> Result<Conformation> {
    info!("Loading input structure from {:?}", path);
    if is_pdb(path) {
        PdbFile::read_from_path(path).map_err(|e| CliError::Pdb {
            path: path.to_path_buf(),
            source: e,
        })
    } else {
        ConfFile::read_from_path(path).map_err(|e| CliError::Structure {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
