use refinepp::core::io::conf::ConfError;
use refinepp::core::io::pdb::PdbError;
use refinepp::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    RefineCore(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to load structure '{path}': {source}", path = path.display())]
    Structure {
        path: PathBuf,
        #[source]
        source: ConfError,
    },

    #[error("Failed to load PDB structure '{path}': {source}", path = path.display())]
    Pdb {
        path: PathBuf,
        #[source]
        source: PdbError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
