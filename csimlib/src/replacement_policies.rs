use crate::cache::CacheLine;

/// A generic trait for implementing replacement policies. Used to parameterise a Cache.
///
/// The cache keeps the per-line metadata itself (insertion order and last use), a policy only
/// decides which of those timestamps matters when a full set needs a victim.
pub trait ReplacementPolicy {
    /// The value compared when looking for a victim, the line with the smallest key is evicted
    ///
    /// # Arguments
    ///
    /// * `line`: A valid line of the set being searched
    ///
    /// returns: u64
    fn eviction_key(&self, line: &CacheLine) -> u64;

    /// Picks the line to evict from a full set, returning its index within the set
    ///
    /// Lines are scanned from left to right and the best candidate is only replaced on a strict
    /// improvement, so ties go to the lowest index. Only called when every line in the set is
    /// valid, and a set is never empty.
    ///
    /// # Arguments
    ///
    /// * `set`: The lines of a single set
    ///
    /// returns: usize
    fn select_victim(&self, set: &[CacheLine]) -> usize {
        debug_assert!(set.iter().all(|line| line.valid));
        let mut min_value = u64::MAX;
        let mut min_index = 0;
        for (index, line) in set.iter().enumerate() {
            let key = self.eviction_key(line);
            if index == 0 || key < min_value {
                min_value = key;
                min_index = index;
            }
        }
        min_index
    }
}

/// NoPolicy is used for direct mapped caches, where each set only has one line to give up
///
/// Every line has the same key, so the scan always settles on the first line. As the generic cache
/// implementation is monomorphised, the compiler can reduce the victim search to that constant.
/// The result is identical to FIFO and LRU with one line per set.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoPolicy;

impl ReplacementPolicy for NoPolicy {
    fn eviction_key(&self, _line: &CacheLine) -> u64 {
        0
    }
}

/// First in, first out. Evicts the line that was filled longest ago, hits don't matter.
#[derive(Debug, Default, Copy, Clone)]
pub struct FirstInFirstOut;

impl ReplacementPolicy for FirstInFirstOut {
    fn eviction_key(&self, line: &CacheLine) -> u64 {
        line.insertion_order
    }
}

/// Least Recently Used replacement policy
///
/// The cache stamps lines with its logical clock on every hit and fill, so the least recently used
/// line is simply the one with the oldest stamp
#[derive(Debug, Default, Copy, Clone)]
pub struct LeastRecentlyUsed;

impl ReplacementPolicy for LeastRecentlyUsed {
    fn eviction_key(&self, line: &CacheLine) -> u64 {
        line.last_used
    }
}
