use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use crate::cache::{AccessOutcome, CacheTrait, GenericCache};
use crate::config::ValidatedConfig;
use crate::error::SimError;
use crate::trace::TraceRecord;

/// The simulator replays traces through a cache, splitting each record into line aligned accesses,
/// and collects results.
///
/// It supports calling simulate multiple times, the cache is kept warm between calls and the time
/// taken and the results accumulate
#[derive(Debug)]
pub struct Simulator {
    cache: GenericCache,
    config: ValidatedConfig,
    simulation_time: Duration,
    records: u64,
    // Reused between records for verbose output
    outcomes: Vec<AccessOutcome>,
}

/// The result of a simulation. Displays as `hits:<H> misses:<M> evictions:<E>`, and can be
/// serialised to JSON
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct SimulationResult {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl Display for SimulationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "hits:{} misses:{} evictions:{}", self.hits, self.misses, self.evictions)
    }
}

impl Simulator {
    /// Creates a new simulator, allocating the cache described by a validated configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A cache configuration, usually the result of [`crate::config::CacheConfig::validate`]
    ///
    /// returns: Simulator
    pub fn new(config: ValidatedConfig) -> Self {
        let geometry = config.geometry;
        debug!(
            "Allocating {} sets x {} lines of {} bytes ({} tag bits, {} set bits, {} offset bits), policy {}",
            geometry.sets(),
            geometry.lines_per_set(),
            geometry.line_size(),
            geometry.tag_bits(),
            geometry.set_index_bits(),
            geometry.block_offset_bits(),
            config.policy
        );
        Self {
            cache: GenericCache::new(geometry, config.policy),
            config,
            simulation_time: Duration::new(0, 0),
            records: 0,
            outcomes: Vec::new(),
        }
    }

    /// Passes one record through the cache, once per touched line for loads and stores, twice for
    /// modifies. Returns the outcome of every access in order.
    pub fn replay_record(&mut self, record: &TraceRecord) -> &[AccessOutcome] {
        self.outcomes.clear();
        let repeats = record.operation.accesses_per_block();
        if repeats == 0 {
            return &self.outcomes;
        }
        for block in record.blocks(self.config.geometry.line_size()) {
            for _ in 0..repeats {
                self.outcomes.push(self.cache.access(block));
            }
        }
        self.records += 1;
        &self.outcomes
    }

    /// Simulates the cache over a trace, one record per line
    ///
    /// Lines which aren't well formed records, or whose operation isn't a load, store or modify,
    /// are skipped
    ///
    /// # Arguments
    ///
    /// * `reader`: The trace
    ///
    /// returns: Result<SimulationResult, SimError>
    pub fn simulate<R: BufRead>(&mut self, reader: R) -> Result<SimulationResult, SimError> {
        self.run(reader, None)
    }

    /// Same as [`Simulator::simulate`], but writes every replayed record followed by the outcome
    /// of each of its accesses, e.g. `M 20,1 miss hit`
    pub fn simulate_verbose<R: BufRead, W: Write>(&mut self, reader: R, out: &mut W) -> Result<SimulationResult, SimError> {
        self.run(reader, Some(out as &mut dyn Write))
    }

    fn run<R: BufRead>(&mut self, reader: R, mut verbose: Option<&mut dyn Write>) -> Result<SimulationResult, SimError> {
        let start = Instant::now();
        for line in reader.lines() {
            let line = line?;
            let record = match TraceRecord::parse(&line) {
                Some(record) => record,
                None => {
                    trace!("Skipping trace line {line:?}");
                    continue;
                }
            };
            let outcomes = self.replay_record(&record);
            if let Some(out) = verbose.as_mut() {
                if record.operation.accesses_per_block() > 0 {
                    write!(out, "{record}")?;
                    for outcome in outcomes {
                        match outcome {
                            AccessOutcome::Hit => write!(out, " hit")?,
                            AccessOutcome::Miss => write!(out, " miss")?,
                            AccessOutcome::MissEviction => write!(out, " miss eviction")?,
                        }
                    }
                    writeln!(out)?;
                }
            }
        }
        self.simulation_time += start.elapsed();
        let result = self.result();
        debug!("Replayed {} records: {result}", self.records);
        Ok(result)
    }

    /// The counters accumulated so far
    pub fn result(&self) -> SimulationResult {
        let stats = self.cache.stats();
        SimulationResult {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
        }
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of lines never filled
    pub fn get_uninitialised_line_count(&self) -> usize {
        self.cache.get_uninitialised_line_count()
    }

    pub fn cache(&self) -> &GenericCache {
        &self.cache
    }
}
