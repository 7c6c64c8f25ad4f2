use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use clap::Parser;
use env_logger::Env;
use log::debug;
use csimlib::config::{CacheConfig, ReplacementPolicyConfig, ValidatedConfig};
use csimlib::error::{ConfigError, SimError};
use csimlib::io::open_trace;
use csimlib::simulator::Simulator;

const EXAMPLES: &str = "Examples:
  $ csim    -S 16  -K 1 -B 16 -p LRU -t traces/yi.trace
  $ csim -v -S 256 -K 2 -B 16 -p LRU -t traces/yi.trace
  $ csim -c l1d.json -p FIFO -t traces/yi.trace";

#[derive(Parser, Debug)]
#[command(name = "csim", about = String::from("Set-associative cache simulator"), after_help = EXAMPLES)]
struct Args {
    /// Number of sets (a power of 2, > 0)
    #[arg(short = 'S', value_name = "num")]
    sets: Option<u64>,

    /// Number of lines per set (> 0)
    #[arg(short = 'K', value_name = "num")]
    lines_per_set: Option<u64>,

    /// Number of bytes per line (a power of 2, > 0)
    #[arg(short = 'B', value_name = "num")]
    line_size: Option<u64>,

    /// Eviction policy, one of 'FIFO', 'LRU'
    #[arg(short = 'p', value_name = "policy")]
    policy: Option<ReplacementPolicyConfig>,

    /// Trace file
    #[arg(short = 't', value_name = "file")]
    trace: Option<PathBuf>,

    /// JSON cache configuration, command line values take precedence
    #[arg(short, long, value_name = "file")]
    config: Option<PathBuf>,

    /// Print the outcome of every access
    #[arg(short, long)]
    verbose: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Print how long the replay took
    #[arg(long)]
    performance: bool,
}

impl Args {
    fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            sets: self.sets,
            lines_per_set: self.lines_per_set,
            line_size: self.line_size,
            policy: self.policy,
        }
    }

    /// Combines the config file, if any, with the command line and validates the result
    fn resolve(&self) -> Result<(ValidatedConfig, &PathBuf), SimError> {
        let base = match &self.config {
            Some(path) => CacheConfig::from_file(path)?,
            None => CacheConfig::default(),
        };
        let config = base.merge(self.cache_config()).validate()?;
        let trace = self.trace.as_ref().ok_or(ConfigError::Missing("trace file (-t)"))?;
        Ok((config, trace))
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let start = Instant::now();
    let args = Args::parse();
    let (config, trace_path) = args.resolve().map_err(|e| e.to_string())?;
    let trace = open_trace(trace_path).map_err(|e| e.to_string())?;
    let mut simulator = Simulator::new(config);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = if args.verbose {
        simulator.simulate_verbose(trace, &mut out)
    } else {
        simulator.simulate(trace)
    }
    .map_err(|e| e.to_string())?;
    if args.json {
        let json = serde_json::to_string(&result).map_err(|e| format!("Couldn't serialise the output {e}"))?;
        writeln!(out, "{json}").map_err(|e| e.to_string())?;
    } else {
        writeln!(out, "{result}").map_err(|e| e.to_string())?;
    }
    if args.performance {
        let simulation_time = simulator.get_execution_time();
        let total_time = start.elapsed();
        writeln!(out, "Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9).map_err(|e| e.to_string())?;
        writeln!(
            out,
            "Total execution time (includes parsing, configuration, and output): {}s",
            total_time.as_nanos() as f64 / 1e9
        )
        .map_err(|e| e.to_string())?;
    }
    debug!("Uninitialised cache lines: {}", simulator.get_uninitialised_line_count());
    out.flush().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn parses_all_flags() {
        let args = Args::try_parse_from(["csim", "-v", "-S", "16", "-K", "2", "-B", "16", "-p", "LRU", "-t", "yi.trace"]).unwrap();
        assert!(args.verbose);
        let (config, trace) = args.resolve().unwrap();
        assert_eq!(config.geometry.sets(), 16);
        assert_eq!(config.geometry.lines_per_set(), 2);
        assert_eq!(config.geometry.line_size(), 16);
        assert_eq!(config.policy, ReplacementPolicyConfig::LeastRecentlyUsed);
        assert_eq!(trace, &PathBuf::from("yi.trace"));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = Args::try_parse_from(["csim", "-S", "1", "-K", "1", "-B", "1", "-p", "MRU", "-t", "t"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn negative_values_are_rejected() {
        assert!(Args::try_parse_from(["csim", "-S", "-4", "-K", "1", "-B", "1", "-p", "LRU", "-t", "t"]).is_err());
    }

    #[test]
    fn missing_arguments() {
        let args = Args::try_parse_from(["csim", "-S", "1", "-K", "1", "-B", "1", "-p", "FIFO"]).unwrap();
        assert_eq!(args.resolve().unwrap_err().to_string(), "missing required argument: trace file (-t)");
        let args = Args::try_parse_from(["csim", "-S", "1", "-B", "1", "-p", "FIFO", "-t", "t"]).unwrap();
        assert!(matches!(args.resolve(), Err(SimError::Config(ConfigError::Missing(_)))));
    }

    #[test]
    fn non_power_of_two() {
        let args = Args::try_parse_from(["csim", "-S", "1", "-K", "3", "-B", "6", "-p", "FIFO", "-t", "t"]).unwrap();
        assert_eq!(args.resolve().unwrap_err().to_string(), "B must be a power of 2, got 6");
    }

    #[test]
    fn config_file_fills_gaps() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sets": 4, "lines_per_set": 2, "line_size": 8, "policy": "LRU"}}"#).unwrap();
        file.flush().unwrap();
        let path = file.path().to_str().unwrap();
        let args = Args::try_parse_from(["csim", "-c", path, "-K", "4", "-p", "FIFO", "-t", "t"]).unwrap();
        let (config, _) = args.resolve().unwrap();
        assert_eq!(config.geometry.sets(), 4);
        assert_eq!(config.geometry.lines_per_set(), 4);
        assert_eq!(config.geometry.line_size(), 8);
        assert_eq!(config.policy, ReplacementPolicyConfig::FirstInFirstOut);
    }

    #[test]
    fn help_lists_examples() {
        let err = Args::try_parse_from(["csim", "-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(err.to_string().contains("Examples:"));
    }
}
