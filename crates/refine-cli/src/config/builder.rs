use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::RefineArgs;
use crate::error::{CliError, Result};
use refinepp::core::scoring::term::ScoreWeights;
use refinepp::engine::config::{
    self as core_config, ExecutionMode, MinimizerConfig, PackerConfig, RejectionPolicy,
};
use std::path::Path;
use std::str::FromStr;

pub fn build_config(args: &RefineArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let sampling_file = file_config.sampling.take().unwrap_or_default();
    let protocol_file = file_config.protocol.take().unwrap_or_default();
    let minimizer_file = file_config.minimizer.take().unwrap_or_default();
    let packer_file = file_config.packer.take().unwrap_or_default();

    let output_prefix = args
        .output_prefix
        .clone()
        .or(file_config.output_prefix.take())
        .unwrap_or(defaults.output_prefix);

    let temperature = args
        .temperature
        .or(sampling_file.temperature)
        .unwrap_or(defaults.temperature);
    let small_moves = args
        .small_moves
        .or(sampling_file.small_moves)
        .unwrap_or(defaults.small_moves);
    let shear_moves = args
        .shear_moves
        .or(sampling_file.shear_moves)
        .unwrap_or(defaults.shear_moves);
    let angle_max = args
        .angle_max
        .or(sampling_file.angle_max)
        .unwrap_or(defaults.angle_max);

    let cycles = args
        .cycles
        .or(protocol_file.cycles)
        .unwrap_or(defaults.cycles);
    let runs = args.runs.or(protocol_file.runs).unwrap_or(defaults.runs);
    let seed = args.seed.or(protocol_file.seed).unwrap_or(defaults.seed);

    let rejection_policy = match args
        .rejection
        .as_deref()
        .or(protocol_file.rejection_policy.as_deref())
    {
        Some(text) => parse_choice::<RejectionPolicy>(text)?,
        None => defaults.rejection_policy,
    };

    let execution = if args.parallel {
        ExecutionMode::Parallel
    } else {
        match protocol_file.execution.as_deref() {
            Some(text) => parse_choice::<ExecutionMode>(text)?,
            None => defaults.execution,
        }
    };

    let observe = !args.no_observe && protocol_file.observe.unwrap_or(defaults.observe);

    let minimize = !args.no_minimize && minimizer_file.enabled.unwrap_or(defaults.minimize);
    let minimizer = minimize.then(|| MinimizerConfig {
        tolerance: minimizer_file.tolerance.unwrap_or(defaults.min_tolerance),
        max_iterations: minimizer_file
            .max_iterations
            .unwrap_or(defaults.min_max_iterations),
    });

    let pack = !args.no_pack && packer_file.enabled.unwrap_or(defaults.pack);
    let packer = pack.then(|| PackerConfig {
        max_passes: packer_file.max_passes.unwrap_or(defaults.pack_max_passes),
    });

    let weights = file_config
        .weights
        .as_ref()
        .map_or(defaults.weights, |w| w.over(defaults.weights));

    let core_config = core_config::RefinementConfigBuilder::new()
        .output_prefix(output_prefix)
        .temperature(temperature)
        .small_moves(small_moves)
        .shear_moves(shear_moves)
        .angle_max(angle_max)
        .cycles(cycles)
        .runs(runs)
        .seed(seed)
        .rejection_policy(rejection_policy)
        .execution(execution)
        .observe(observe)
        .minimizer(minimizer)
        .packer(packer)
        .weights(weights)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        input_path: args.input.clone(),
        output_dir: args.output_dir.clone(),
        core_config,
    })
}

/// Score weights from an optional config file, for commands that only score.
pub fn load_weights(config_path: Option<&Path>) -> Result<ScoreWeights> {
    let defaults = DefaultsConfig::default();
    let Some(path) = config_path else {
        return Ok(defaults.weights);
    };
    let file_config = FileConfig::from_file(path)?;
    Ok(file_config
        .weights
        .as_ref()
        .map_or(defaults.weights, |w| w.over(defaults.weights)))
}

fn parse_choice<T>(text: &str) -> Result<T>
where
    T: FromStr<Err = core_config::ConfigError>,
{
    text.parse().map_err(|e: core_config::ConfigError| CliError::Config(e.to_string()))
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "output-prefix" => config.output_prefix = Some(value.to_string()),
            "sampling.temperature" => {
                config.sampling.get_or_insert_with(Default::default).temperature =
                    Some(parse_value(key, value)?);
            }
            "sampling.small-moves" => {
                config.sampling.get_or_insert_with(Default::default).small_moves =
                    Some(parse_value(key, value)?);
            }
            "sampling.shear-moves" => {
                config.sampling.get_or_insert_with(Default::default).shear_moves =
                    Some(parse_value(key, value)?);
            }
            "sampling.angle-max" => {
                config.sampling.get_or_insert_with(Default::default).angle_max =
                    Some(parse_value(key, value)?);
            }
            "protocol.cycles" => {
                config.protocol.get_or_insert_with(Default::default).cycles =
                    Some(parse_value(key, value)?);
            }
            "protocol.runs" => {
                config.protocol.get_or_insert_with(Default::default).runs =
                    Some(parse_value(key, value)?);
            }
            "protocol.seed" => {
                config.protocol.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value)?);
            }
            "protocol.rejection-policy" => {
                config
                    .protocol
                    .get_or_insert_with(Default::default)
                    .rejection_policy = Some(value.to_string());
            }
            "protocol.execution" => {
                config.protocol.get_or_insert_with(Default::default).execution =
                    Some(value.to_string());
            }
            "protocol.observe" => {
                config.protocol.get_or_insert_with(Default::default).observe =
                    Some(parse_value(key, value)?);
            }
            "minimizer.enabled" => {
                config.minimizer.get_or_insert_with(Default::default).enabled =
                    Some(parse_value(key, value)?);
            }
            "minimizer.tolerance" => {
                config.minimizer.get_or_insert_with(Default::default).tolerance =
                    Some(parse_value(key, value)?);
            }
            "minimizer.max-iterations" => {
                config
                    .minimizer
                    .get_or_insert_with(Default::default)
                    .max_iterations = Some(parse_value(key, value)?);
            }
            "packer.enabled" => {
                config.packer.get_or_insert_with(Default::default).enabled =
                    Some(parse_value(key, value)?);
            }
            "packer.max-passes" => {
                config.packer.get_or_insert_with(Default::default).max_passes =
                    Some(parse_value(key, value)?);
            }
            "weights.rama" => {
                config.weights.get_or_insert_with(Default::default).rama =
                    Some(parse_value(key, value)?);
            }
            "weights.omega" => {
                config.weights.get_or_insert_with(Default::default).omega =
                    Some(parse_value(key, value)?);
            }
            "weights.rotamer" => {
                config.weights.get_or_insert_with(Default::default).rotamer =
                    Some(parse_value(key, value)?);
            }
            "weights.chi-pair" => {
                config.weights.get_or_insert_with(Default::default).chi_pair =
                    Some(parse_value(key, value)?);
            }
            "weights.clash" => {
                config.weights.get_or_insert_with(Default::default).clash =
                    Some(parse_value(key, value)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
