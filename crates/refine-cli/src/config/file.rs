use crate::error::{CliError, Result};
use refinepp::core::scoring::term::ScoreWeights;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSamplingConfig {
    pub temperature: Option<f64>,
    pub small_moves: Option<usize>,
    pub shear_moves: Option<usize>,
    pub angle_max: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileProtocolConfig {
    pub cycles: Option<usize>,
    pub runs: Option<usize>,
    pub seed: Option<u64>,
    pub rejection_policy: Option<String>,
    pub execution: Option<String>,
    pub observe: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileMinimizerConfig {
    pub enabled: Option<bool>,
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePackerConfig {
    pub enabled: Option<bool>,
    pub max_passes: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileWeightsConfig {
    pub rama: Option<f64>,
    pub omega: Option<f64>,
    pub rotamer: Option<f64>,
    pub chi_pair: Option<f64>,
    pub clash: Option<f64>,
}

impl FileWeightsConfig {
    /// Fills the weights that are present in the file over `base`.
    pub fn over(&self, base: ScoreWeights) -> ScoreWeights {
        ScoreWeights {
            rama: self.rama.unwrap_or(base.rama),
            omega: self.omega.unwrap_or(base.omega),
            rotamer: self.rotamer.unwrap_or(base.rotamer),
            chi_pair: self.chi_pair.unwrap_or(base.chi_pair),
            clash: self.clash.unwrap_or(base.clash),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub output_prefix: Option<String>,
    pub sampling: Option<FileSamplingConfig>,
    pub protocol: Option<FileProtocolConfig>,
    pub minimizer: Option<FileMinimizerConfig>,
    pub packer: Option<FilePackerConfig>,
    pub weights: Option<FileWeightsConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
