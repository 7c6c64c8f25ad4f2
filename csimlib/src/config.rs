use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::{ConfigError, SimError};
use crate::geometry::Geometry;

/// A configuration for a single cache
///
/// Every field is optional so a config file and command line arguments can each provide part of
/// it, see [`CacheConfig::merge`]. All of them must be present by the time it is validated.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Number of sets (S)
    pub sets: Option<u64>,
    /// Number of lines per set (K)
    pub lines_per_set: Option<u64>,
    /// Number of bytes per line (B)
    pub line_size: Option<u64>,
    pub policy: Option<ReplacementPolicyConfig>,
}

/// The eviction policy used when a miss lands in a full set
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ReplacementPolicyConfig {
    #[serde(rename = "FIFO", alias = "fifo")]
    FirstInFirstOut,
    #[serde(rename = "LRU", alias = "lru")]
    LeastRecentlyUsed,
}

/// A configuration which passed validation
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ValidatedConfig {
    pub geometry: Geometry,
    pub policy: ReplacementPolicyConfig,
}

impl CacheConfig {
    /// Reads a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SimError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Overlays `other` on top of this config, values present in `other` win
    pub fn merge(self, other: CacheConfig) -> CacheConfig {
        CacheConfig {
            sets: other.sets.or(self.sets),
            lines_per_set: other.lines_per_set.or(self.lines_per_set),
            line_size: other.line_size.or(self.line_size),
            policy: other.policy.or(self.policy),
        }
    }

    /// Checks every value is present and describes a cache that can be simulated
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let sets = self.sets.ok_or(ConfigError::Missing("number of sets (-S)"))?;
        let lines_per_set = self.lines_per_set.ok_or(ConfigError::Missing("lines per set (-K)"))?;
        let line_size = self.line_size.ok_or(ConfigError::Missing("bytes per line (-B)"))?;
        let policy = self.policy.ok_or(ConfigError::Missing("eviction policy (-p)"))?;
        Ok(ValidatedConfig {
            geometry: Geometry::new(sets, lines_per_set, line_size)?,
            policy,
        })
    }
}

impl FromStr for ReplacementPolicyConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIFO" => Ok(ReplacementPolicyConfig::FirstInFirstOut),
            "LRU" => Ok(ReplacementPolicyConfig::LeastRecentlyUsed),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

impl Display for ReplacementPolicyConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplacementPolicyConfig::FirstInFirstOut => write!(f, "FIFO"),
            ReplacementPolicyConfig::LeastRecentlyUsed => write!(f, "LRU"),
        }
    }
}
