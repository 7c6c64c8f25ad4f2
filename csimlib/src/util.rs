use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use crate::config::{CacheConfig, ReplacementPolicyConfig, ValidatedConfig};
use crate::simulator::SimulationResult;

pub const TRACE_FILES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/traces");
pub const EXPECTED_OUTPUTS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/expected");

/// A trace, the cache to replay it through, and the summary that must come out
#[derive(Debug)]
pub struct TestCase {
    pub name: String,
    pub trace: PathBuf,
    pub config: ValidatedConfig,
    pub expected: SimulationResult,
}

/// Collects the reference cases shipped with the crate
pub fn get_cases() -> Result<Vec<TestCase>, Box<dyn Error>> {
    get_cases_from(Path::new(EXPECTED_OUTPUTS_PATH), Path::new(TRACE_FILES_PATH))
}

/// Collects reference cases from a directory of expected outputs
///
/// Every file named `<trace>-s<S>-k<K>-b<B>-<fifo|lru>.expected` is a case, replaying
/// `<trace>.trace` from `traces` and holding a single summary line
pub fn get_cases_from(expected: &Path, traces: &Path) -> Result<Vec<TestCase>, Box<dyn Error>> {
    let mut out = Vec::new();
    let output_pattern = Regex::new(
        r"^(?P<trace>[0-9a-zA-Z_]+)-s(?P<sets>[0-9]+)-k(?P<lines>[0-9]+)-b(?P<bytes>[0-9]+)-(?P<policy>fifo|lru)\.expected$",
    )?;
    let summary_pattern = Regex::new(r"hits:(?P<hits>[0-9]+) misses:(?P<misses>[0-9]+) evictions:(?P<evictions>[0-9]+)")?;
    let mut files = fs::read_dir(expected)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| output_pattern.is_match(name))
        .collect::<Vec<_>>();
    files.sort();
    for file_name in files {
        // Get components of name
        let tokens = output_pattern.captures(&file_name).ok_or("Couldn't parse the file name")?;
        let policy = match &tokens["policy"] {
            "fifo" => ReplacementPolicyConfig::FirstInFirstOut,
            _ => ReplacementPolicyConfig::LeastRecentlyUsed,
        };
        let config = CacheConfig {
            sets: Some(tokens["sets"].parse()?),
            lines_per_set: Some(tokens["lines"].parse()?),
            line_size: Some(tokens["bytes"].parse()?),
            policy: Some(policy),
        }
        .validate()?;
        // Read expected output
        let contents = fs::read_to_string(expected.join(&file_name))?;
        let summary = summary_pattern
            .captures(&contents)
            .ok_or_else(|| format!("No summary line in {file_name}"))?;
        out.push(TestCase {
            name: file_name.trim_end_matches(".expected").to_string(),
            trace: traces.join(format!("{}.trace", &tokens["trace"])),
            config,
            expected: SimulationResult {
                hits: summary["hits"].parse()?,
                misses: summary["misses"].parse()?,
                evictions: summary["evictions"].parse()?,
            },
        })
    }
    Ok(out)
}
