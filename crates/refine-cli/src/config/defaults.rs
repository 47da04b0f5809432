use refinepp::core::scoring::term::ScoreWeights;
use refinepp::engine::config::{self as core_config, ExecutionMode, RejectionPolicy};

pub struct DefaultsConfig {
    pub output_prefix: String,
    pub temperature: f64,
    pub small_moves: usize,
    pub shear_moves: usize,
    pub angle_max: f64,
    pub cycles: usize,
    pub runs: usize,
    pub seed: u64,
    pub rejection_policy: RejectionPolicy,
    pub execution: ExecutionMode,
    pub observe: bool,
    pub minimize: bool,
    pub min_tolerance: f64,
    pub min_max_iterations: usize,
    pub pack: bool,
    pub pack_max_passes: usize,
    pub weights: ScoreWeights,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_prefix: core_config::DEFAULT_OUTPUT_PREFIX.to_string(),
            temperature: core_config::DEFAULT_TEMPERATURE,
            small_moves: core_config::DEFAULT_SMALL_MOVES,
            shear_moves: core_config::DEFAULT_SHEAR_MOVES,
            angle_max: core_config::DEFAULT_ANGLE_MAX,
            cycles: core_config::DEFAULT_CYCLES,
            runs: core_config::DEFAULT_RUNS,
            seed: core_config::DEFAULT_SEED,
            rejection_policy: RejectionPolicy::default(),
            execution: ExecutionMode::default(),
            observe: true,
            minimize: true,
            min_tolerance: core_config::DEFAULT_MIN_TOLERANCE,
            min_max_iterations: core_config::DEFAULT_MIN_MAX_ITERATIONS,
            pack: true,
            pack_max_passes: core_config::DEFAULT_PACK_MAX_PASSES,
            weights: ScoreWeights::default(),
        }
    }
}
