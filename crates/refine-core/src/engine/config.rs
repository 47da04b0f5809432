use crate::core::scoring::term::ScoreWeights;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_TEMPERATURE: f64 = 1.0;
pub const DEFAULT_SMALL_MOVES: usize = 3;
pub const DEFAULT_SHEAR_MOVES: usize = 5;
pub const DEFAULT_ANGLE_MAX: f64 = 7.0;
pub const DEFAULT_CYCLES: usize = 9;
pub const DEFAULT_RUNS: usize = 1;
pub const DEFAULT_OUTPUT_PREFIX: &str = "refine_output";
pub const DEFAULT_SEED: u64 = 1_111_111;
pub const DEFAULT_MIN_TOLERANCE: f64 = 0.01;
pub const DEFAULT_MIN_MAX_ITERATIONS: usize = 200;
pub const DEFAULT_PACK_MAX_PASSES: usize = 5;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// What happens to the working state when the gate rejects a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RejectionPolicy {
    /// Restore the last accepted state.
    #[default]
    Revert,
    /// Keep the rejected state and continue from it; only the best snapshot is tracked.
    Drift,
}

impl FromStr for RejectionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "revert" => Ok(Self::Revert),
            "drift" => Ok(Self::Drift),
            other => Err(invalid(
                "rejection_policy",
                format!("expected 'revert' or 'drift', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for RejectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revert => write!(f, "revert"),
            Self::Drift => write!(f, "drift"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Runs one after another on a single random stream.
    #[default]
    Sequential,
    /// Runs on the rayon pool, each with its own stream derived from the seed.
    Parallel,
}

impl FromStr for ExecutionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "parallel" => Ok(Self::Parallel),
            other => Err(invalid(
                "execution",
                format!("expected 'sequential' or 'parallel', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f64,
    pub small_moves: usize,
    pub shear_moves: usize,
    pub angle_max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolConfig {
    pub cycles: usize,
    pub runs: usize,
    pub rejection_policy: RejectionPolicy,
    pub execution: ExecutionMode,
    pub seed: u64,
    pub observe: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinimizerConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for MinimizerConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_MIN_TOLERANCE,
            max_iterations: DEFAULT_MIN_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackerConfig {
    pub max_passes: usize,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_PACK_MAX_PASSES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefinementConfig {
    pub sampling: SamplingConfig,
    pub protocol: ProtocolConfig,
    /// `None` disables the minimization step of each trial.
    pub minimizer: Option<MinimizerConfig>,
    /// `None` disables the packing step of each trial.
    pub packer: Option<PackerConfig>,
    pub output_prefix: String,
    pub weights: ScoreWeights,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig {
                temperature: DEFAULT_TEMPERATURE,
                small_moves: DEFAULT_SMALL_MOVES,
                shear_moves: DEFAULT_SHEAR_MOVES,
                angle_max: DEFAULT_ANGLE_MAX,
            },
            protocol: ProtocolConfig {
                cycles: DEFAULT_CYCLES,
                runs: DEFAULT_RUNS,
                rejection_policy: RejectionPolicy::default(),
                execution: ExecutionMode::default(),
                seed: DEFAULT_SEED,
                observe: true,
            },
            minimizer: Some(MinimizerConfig::default()),
            packer: Some(PackerConfig::default()),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            weights: ScoreWeights::default(),
        }
    }
}

/// Builds a validated [`RefinementConfig`]; unset values take the protocol defaults.
#[derive(Default)]
pub struct RefinementConfigBuilder {
    temperature: Option<f64>,
    small_moves: Option<usize>,
    shear_moves: Option<usize>,
    angle_max: Option<f64>,
    cycles: Option<usize>,
    runs: Option<usize>,
    rejection_policy: Option<RejectionPolicy>,
    execution: Option<ExecutionMode>,
    seed: Option<u64>,
    observe: Option<bool>,
    minimizer: Option<Option<MinimizerConfig>>,
    packer: Option<Option<PackerConfig>>,
    output_prefix: Option<String>,
    weights: Option<ScoreWeights>,
}

impl RefinementConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, kt: f64) -> Self {
        self.temperature = Some(kt);
        self
    }
    pub fn small_moves(mut self, n: usize) -> Self {
        self.small_moves = Some(n);
        self
    }
    pub fn shear_moves(mut self, n: usize) -> Self {
        self.shear_moves = Some(n);
        self
    }
    pub fn angle_max(mut self, degrees: f64) -> Self {
        self.angle_max = Some(degrees);
        self
    }
    pub fn cycles(mut self, n: usize) -> Self {
        self.cycles = Some(n);
        self
    }
    pub fn runs(mut self, n: usize) -> Self {
        self.runs = Some(n);
        self
    }
    pub fn rejection_policy(mut self, policy: RejectionPolicy) -> Self {
        self.rejection_policy = Some(policy);
        self
    }
    pub fn execution(mut self, mode: ExecutionMode) -> Self {
        self.execution = Some(mode);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn observe(mut self, enabled: bool) -> Self {
        self.observe = Some(enabled);
        self
    }
    pub fn minimizer(mut self, config: Option<MinimizerConfig>) -> Self {
        self.minimizer = Some(config);
        self
    }
    pub fn packer(mut self, config: Option<PackerConfig>) -> Self {
        self.packer = Some(config);
        self
    }
    pub fn output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = Some(prefix.into());
        self
    }
    pub fn weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn build(self) -> Result<RefinementConfig, ConfigError> {
        let defaults = RefinementConfig::default();

        let temperature = self.temperature.unwrap_or(defaults.sampling.temperature);
        if !temperature.is_finite() {
            return Err(invalid("temperature", "must be a finite number"));
        }

        let angle_max = self.angle_max.unwrap_or(defaults.sampling.angle_max);
        if !angle_max.is_finite() || angle_max < 0.0 {
            return Err(invalid("angle_max", "must be a finite, non-negative angle"));
        }

        let minimizer = self.minimizer.unwrap_or(defaults.minimizer);
        if let Some(min) = &minimizer {
            if !(min.tolerance.is_finite() && min.tolerance > 0.0) {
                return Err(invalid("minimizer.tolerance", "must be positive"));
            }
            if min.max_iterations == 0 {
                return Err(invalid("minimizer.max_iterations", "must be at least 1"));
            }
        }

        let packer = self.packer.unwrap_or(defaults.packer);
        if let Some(pack) = &packer {
            if pack.max_passes == 0 {
                return Err(invalid("packer.max_passes", "must be at least 1"));
            }
        }

        let output_prefix = self.output_prefix.unwrap_or(defaults.output_prefix);
        if output_prefix.trim().is_empty() {
            return Err(invalid("output_prefix", "must not be empty"));
        }
        if output_prefix.contains(['/', '\\']) {
            return Err(invalid("output_prefix", "must not contain path separators"));
        }

        let weights = self.weights.unwrap_or(defaults.weights);
        let all_finite = [
            weights.rama,
            weights.omega,
            weights.rotamer,
            weights.chi_pair,
            weights.clash,
        ]
        .iter()
        .all(|w| w.is_finite());
        if !all_finite {
            return Err(invalid("weights", "every score weight must be finite"));
        }

        Ok(RefinementConfig {
            sampling: SamplingConfig {
                temperature,
                small_moves: self.small_moves.unwrap_or(defaults.sampling.small_moves),
                shear_moves: self.shear_moves.unwrap_or(defaults.sampling.shear_moves),
                angle_max,
            },
            protocol: ProtocolConfig {
                cycles: self.cycles.unwrap_or(defaults.protocol.cycles),
                runs: self.runs.unwrap_or(defaults.protocol.runs),
                rejection_policy: self
                    .rejection_policy
                    .unwrap_or(defaults.protocol.rejection_policy),
                execution: self.execution.unwrap_or(defaults.protocol.execution),
                seed: self.seed.unwrap_or(defaults.protocol.seed),
                observe: self.observe.unwrap_or(defaults.protocol.observe),
            },
            minimizer,
            packer,
            output_prefix,
            weights,
        })
    }
}
