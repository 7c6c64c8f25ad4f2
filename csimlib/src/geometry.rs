use crate::error::ConfigError;

/// Width of every simulated address, in bits
pub const ADDRESS_BITS: u32 = u64::BITS;

/// The shape of a cache: how many sets, how many lines in each set, and how many bytes per line
///
/// A `Geometry` can only be built through [`Geometry::new`], so holding one guarantees that the
/// set count and the line size are powers of two and that every dimension is non-zero. The
/// decoder relies on this and never checks again.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Geometry {
    sets: u64,
    lines_per_set: u64,
    line_size: u64,
    set_index_bits: u32,
    block_offset_bits: u32,
}

impl Geometry {
    /// Validates and creates a geometry
    ///
    /// # Arguments
    ///
    /// * `sets`: The number of sets (S), a power of two
    /// * `lines_per_set`: The associativity (K), at least one
    /// * `line_size`: The bytes per line (B), a power of two
    ///
    /// returns: Result<Geometry, ConfigError>
    pub fn new(sets: u64, lines_per_set: u64, line_size: u64) -> Result<Self, ConfigError> {
        if sets == 0 {
            return Err(ConfigError::Zero("number of sets (S)"));
        }
        if lines_per_set == 0 {
            return Err(ConfigError::Zero("lines per set (K)"));
        }
        if line_size == 0 {
            return Err(ConfigError::Zero("bytes per line (B)"));
        }
        if !sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo { name: "S", value: sets });
        }
        if !line_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo { name: "B", value: line_size });
        }
        // Storage is one allocation of S * K lines
        if sets.checked_mul(lines_per_set).and_then(|n| usize::try_from(n).ok()).is_none() {
            return Err(ConfigError::TooLarge { sets, lines_per_set });
        }
        Ok(Self {
            sets,
            lines_per_set,
            line_size,
            set_index_bits: sets.trailing_zeros(),
            block_offset_bits: line_size.trailing_zeros(),
        })
    }

    pub fn sets(&self) -> u64 {
        self.sets
    }

    pub fn lines_per_set(&self) -> u64 {
        self.lines_per_set
    }

    pub fn line_size(&self) -> u64 {
        self.line_size
    }

    /// Total number of lines, S * K
    pub fn total_lines(&self) -> usize {
        // Checked in new
        (self.sets * self.lines_per_set) as usize
    }

    pub fn set_index_bits(&self) -> u32 {
        self.set_index_bits
    }

    pub fn block_offset_bits(&self) -> u32 {
        self.block_offset_bits
    }

    pub fn tag_bits(&self) -> u32 {
        ADDRESS_BITS - self.set_index_bits - self.block_offset_bits
    }

    /// Splits an address into its tag and set index
    ///
    /// The set index is usable directly as an index into a collection of sets, the tag is shifted
    /// down so it only holds the tag bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use csimlib::geometry::Geometry;
    /// let geometry = Geometry::new(16, 2, 16).unwrap();
    /// assert_eq!(geometry.decode(0x210), (2, 1));
    /// ```
    pub fn decode(&self, address: u64) -> (u64, u64) {
        decode(address, self.sets, self.line_size)
    }

    /// The byte position of an address inside its block
    pub fn block_offset(&self, address: u64) -> u64 {
        address & (self.line_size - 1)
    }

    /// Rounds an address down to the start of its block
    pub fn block_address(&self, address: u64) -> u64 {
        address - self.block_offset(address)
    }
}

/// Decodes an address into `(tag, set_index)` for a cache of `sets` sets and `line_size` byte lines
///
/// Both `sets` and `line_size` must be powers of two, this is checked when a [`Geometry`] is
/// built, not here.
pub fn decode(address: u64, sets: u64, line_size: u64) -> (u64, u64) {
    let block_offset_bits = line_size.trailing_zeros();
    let set_index_bits = sets.trailing_zeros();
    let set_index = address.checked_shr(block_offset_bits).unwrap_or(0) & (sets - 1);
    // The shift reaches 64 when the tag has no bits left
    let tag = address.checked_shr(block_offset_bits + set_index_bits).unwrap_or(0);
    (tag, set_index)
}
