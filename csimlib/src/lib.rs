//! # CsimLib
//!
//! CsimLib simulates a single level set-associative cache over a memory access trace, counting
//! hits, misses and evictions exactly as the modelled hardware would
//!
//! It provides the address decoder, a generic cache parameterised by an eviction policy (FIFO or
//! LRU), and a simulator which replays traces in the `<op> <hex address>,<size>` format

/// Address decomposition into tag, set index and block offset
pub mod geometry;

/// Contains the implementation of the cache, and a utility enum for the supported policies
pub mod cache;

/// Contains the cache configuration, which can be read from JSON or assembled from arguments
pub mod config;

/// Contains the provided replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Contains the simulator used to replay a trace with a given cache configuration
pub mod simulator;

/// Parsing of trace records and splitting them into line accesses
pub mod trace;

/// Configuration and simulation errors
pub mod error;

/// Opening trace files
pub mod io;

#[cfg(test)]
mod test;

/// Contains utilities for running reference cases and benchmarks.
pub mod util;
