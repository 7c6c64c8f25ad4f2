use std::io;
use thiserror::Error;

/// A configuration that can't be simulated. Always detected before any access happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required argument: {0}")]
    Missing(&'static str),

    #[error("{0} must be greater than 0")]
    Zero(&'static str),

    #[error("{name} must be a power of 2, got {value}")]
    NotPowerOfTwo { name: &'static str, value: u64 },

    #[error("a cache with {sets} sets of {lines_per_set} lines can't be allocated")]
    TooLarge { sets: u64, lines_per_set: u64 },

    #[error("no matching policy for '{0}', expected one of 'FIFO', 'LRU'")]
    UnknownPolicy(String),
}

/// Errors raised while setting up or running a simulation
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("couldn't open {path}: {source}")]
    Open { path: String, source: io::Error },

    #[error("couldn't parse the config file: {0}")]
    ConfigFile(#[from] serde_json::Error),

    #[error("couldn't read the trace: {0}")]
    Trace(#[from] io::Error),
}
