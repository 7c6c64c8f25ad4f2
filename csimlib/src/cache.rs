use log::trace;
use serde::{Deserialize, Serialize};
use crate::config::ReplacementPolicyConfig;
use crate::geometry::Geometry;
use crate::replacement_policies::{FirstInFirstOut, LeastRecentlyUsed, NoPolicy, ReplacementPolicy};

/// One storage slot of the cache
///
/// `tag`, `insertion_order` and `last_used` mean nothing while `valid` is false, the cache never
/// lets a policy compare an invalid line.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: u64,
    /// Clock value of the last fill, used by FIFO
    pub insertion_order: u64,
    /// Clock value of the last fill or hit, used by LRU
    pub last_used: u64,
}

impl CacheLine {
    fn fill(&mut self, tag: u64, time: u64) {
        self.valid = true;
        self.tag = tag;
        self.insertion_order = time;
        self.last_used = time;
    }
}

/// What a single access did to the cache
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AccessOutcome {
    Hit,
    /// Miss filled an empty line
    Miss,
    /// Miss had to evict a valid line
    MissEviction,
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessOutcome::Hit)
    }
}

/// Hit, miss and eviction counters for one cache
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    fn record(&mut self, outcome: AccessOutcome) {
        match outcome {
            AccessOutcome::Hit => self.hits += 1,
            AccessOutcome::Miss => self.misses += 1,
            AccessOutcome::MissEviction => {
                self.misses += 1;
                self.evictions += 1;
            }
        }
    }
}

/// A generic trait for caches
///
/// Technically not required as we're using static dispatch instead of dyn Cache, but it keeps the
/// policy specific caches and [`GenericCache`] interchangeable for the simulator
///
/// The trait assumes that splitting accesses spanning multiple cache lines is the responsibility of
/// the caller
pub trait CacheTrait {
    /// Converts an address into a tag and a set
    ///
    /// # Arguments
    ///
    /// * `input`: The address
    ///
    /// returns: (u64, u64)
    fn address_to_tag_and_set(&self, input: u64) -> (u64, u64);

    /// Accesses the line holding an address, updating the line metadata, the logical clock and the
    /// counters
    ///
    /// # Arguments
    ///
    /// * `input`: The address of the access. Note this is for the line at that address, hence no
    /// size argument
    ///
    /// returns: AccessOutcome
    fn access(&mut self, input: u64) -> AccessOutcome;

    /// Gets the geometry this cache was built with
    fn geometry(&self) -> &Geometry;

    /// Gets the counters accumulated so far
    fn stats(&self) -> CacheStats;

    /// Gets the number of lines which have never been filled. Useful for analysing cache
    /// performance or debugging
    fn get_uninitialised_line_count(&self) -> usize;
}

/// A set-associative cache, parameterised by a replacement policy
///
/// The lines of all sets live in one allocation, set `n` owns the slice
/// `[n * K, n * K + K)`. The allocation is made once in [`Cache::new`] and never resized.
///
/// Relying on monomorphisation means the policy's key lookup is inlined into the victim search,
/// which should be close to on par with writing specialised implementations for each policy
#[derive(Debug)]
pub struct Cache<R: ReplacementPolicy> {
    geometry: Geometry,
    lines: Vec<CacheLine>,
    replacement_policy: R,
    // Advanced once per access, never reset
    time: u64,
    stats: CacheStats,
}

impl<R: ReplacementPolicy> Cache<R> {
    pub fn new(geometry: Geometry, policy: R) -> Self {
        Self {
            lines: vec![CacheLine::default(); geometry.total_lines()],
            geometry,
            replacement_policy: policy,
            time: 0,
            stats: CacheStats::default(),
        }
    }

    /// The current value of the logical clock, the number of accesses so far
    pub fn time(&self) -> u64 {
        self.time
    }

    /// The lines of one set, in slot order
    ///
    /// # Panics
    ///
    /// Panics if `set` is not below the geometry's number of sets
    pub fn set(&self, set: u64) -> &[CacheLine] {
        let k = self.geometry.lines_per_set() as usize;
        let lower = set as usize * k;
        &self.lines[lower..lower + k]
    }
}

impl<R: ReplacementPolicy> CacheTrait for Cache<R> {
    fn address_to_tag_and_set(&self, input: u64) -> (u64, u64) {
        self.geometry.decode(input)
    }

    fn access(&mut self, input: u64) -> AccessOutcome {
        let (tag, set) = self.address_to_tag_and_set(input);
        self.time += 1;
        let time = self.time;
        let k = self.geometry.lines_per_set() as usize;
        let set_inclusive_lower_bound = set as usize * k;
        // Only search the relevant set
        let lines = &mut self.lines[set_inclusive_lower_bound..set_inclusive_lower_bound + k];

        let hit = lines.iter().position(|l| l.valid && l.tag == tag);
        let outcome = match hit {
            Some(index) => {
                lines[index].last_used = time;
                AccessOutcome::Hit
            }
            None => match lines.iter().position(|l| !l.valid) {
                Some(empty) => {
                    lines[empty].fill(tag, time);
                    AccessOutcome::Miss
                }
                None => {
                    let victim = self.replacement_policy.select_victim(lines);
                    lines[victim].fill(tag, time);
                    AccessOutcome::MissEviction
                }
            },
        };
        trace!("access {input:#x} tag={tag:#x} set={set} -> {outcome:?}");
        self.stats.record(outcome);
        outcome
    }

    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn stats(&self) -> CacheStats {
        self.stats
    }

    fn get_uninitialised_line_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.valid).count()
    }
}

/// Enum for the cache types provided by the library
///
/// Using trait objects in Rust reduces boilerplate, but the call is completely opaque to the
/// compiler, and the simulator makes one for every block of every trace record
///
/// It's much faster to explicitly branch on all implementations, as the compiler can reason about
/// the concrete types, perform function inlining etc
#[derive(Debug)]
pub enum GenericCache {
    FirstInFirstOut(Cache<FirstInFirstOut>),
    LeastRecentlyUsed(Cache<LeastRecentlyUsed>),
    NoPolicy(Cache<NoPolicy>),
}

impl GenericCache {
    /// Builds the cache for a geometry and policy
    ///
    /// Direct mapped caches (one line per set) ignore the policy, every policy would pick the only
    /// line in the set anyway
    pub fn new(geometry: Geometry, policy: ReplacementPolicyConfig) -> Self {
        if geometry.lines_per_set() == 1 {
            return GenericCache::from(Cache::new(geometry, NoPolicy));
        }
        match policy {
            ReplacementPolicyConfig::FirstInFirstOut => {
                GenericCache::from(Cache::new(geometry, FirstInFirstOut))
            }
            ReplacementPolicyConfig::LeastRecentlyUsed => {
                GenericCache::from(Cache::new(geometry, LeastRecentlyUsed))
            }
        }
    }
}

impl From<Cache<FirstInFirstOut>> for GenericCache {
    fn from(value: Cache<FirstInFirstOut>) -> Self {
        Self::FirstInFirstOut(value)
    }
}

impl From<Cache<LeastRecentlyUsed>> for GenericCache {
    fn from(value: Cache<LeastRecentlyUsed>) -> Self {
        Self::LeastRecentlyUsed(value)
    }
}

impl From<Cache<NoPolicy>> for GenericCache {
    fn from(value: Cache<NoPolicy>) -> Self {
        Self::NoPolicy(value)
    }
}

impl CacheTrait for GenericCache {
    fn address_to_tag_and_set(&self, input: u64) -> (u64, u64) {
        match self {
            GenericCache::FirstInFirstOut(c) => c.address_to_tag_and_set(input),
            GenericCache::LeastRecentlyUsed(c) => c.address_to_tag_and_set(input),
            GenericCache::NoPolicy(c) => c.address_to_tag_and_set(input),
        }
    }

    fn access(&mut self, input: u64) -> AccessOutcome {
        match self {
            GenericCache::FirstInFirstOut(c) => c.access(input),
            GenericCache::LeastRecentlyUsed(c) => c.access(input),
            GenericCache::NoPolicy(c) => c.access(input),
        }
    }

    fn geometry(&self) -> &Geometry {
        match self {
            GenericCache::FirstInFirstOut(c) => c.geometry(),
            GenericCache::LeastRecentlyUsed(c) => c.geometry(),
            GenericCache::NoPolicy(c) => c.geometry(),
        }
    }

    fn stats(&self) -> CacheStats {
        match self {
            GenericCache::FirstInFirstOut(c) => c.stats(),
            GenericCache::LeastRecentlyUsed(c) => c.stats(),
            GenericCache::NoPolicy(c) => c.stats(),
        }
    }

    fn get_uninitialised_line_count(&self) -> usize {
        match self {
            GenericCache::FirstInFirstOut(c) => c.get_uninitialised_line_count(),
            GenericCache::LeastRecentlyUsed(c) => c.get_uninitialised_line_count(),
            GenericCache::NoPolicy(c) => c.get_uninitialised_line_count(),
        }
    }
}
