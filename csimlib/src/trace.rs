use std::fmt::{Display, Formatter};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // <op> <hex address>,<decimal size>, anything after the size is ignored
    static ref RECORD: Regex =
        Regex::new(r"^\s*(?P<op>[A-Za-z])\s+(?:0[xX])?(?P<address>[0-9a-fA-F]+),\s*(?P<size>[0-9]+)").unwrap();
}

/// The kind of memory access a trace record describes
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Operation {
    /// Instruction fetch, irrelevant to a data cache
    Instruction,
    Load,
    Store,
    /// A load immediately followed by a store to the same data
    Modify,
}

impl Operation {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Operation::Instruction),
            'L' => Some(Operation::Load),
            'S' => Some(Operation::Store),
            'M' => Some(Operation::Modify),
            _ => None,
        }
    }

    /// How many times each touched block is passed through the cache
    pub fn accesses_per_block(&self) -> usize {
        match self {
            Operation::Instruction => 0,
            Operation::Load | Operation::Store => 1,
            Operation::Modify => 2,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Operation::Instruction => 'I',
            Operation::Load => 'L',
            Operation::Store => 'S',
            Operation::Modify => 'M',
        }
    }
}

/// A single line of a trace file
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TraceRecord {
    pub operation: Operation,
    pub address: u64,
    pub size: u64,
}

impl TraceRecord {
    /// Parses one trace line, returning None for anything that isn't a well formed record with a
    /// known operation letter
    ///
    /// # Examples
    ///
    /// ```
    /// use csimlib::trace::{Operation, TraceRecord};
    /// let record = TraceRecord::parse(" L 10,4").unwrap();
    /// assert_eq!(record.operation, Operation::Load);
    /// assert_eq!(record.address, 0x10);
    /// assert_eq!(record.size, 4);
    /// assert!(TraceRecord::parse("==1234== Memcheck").is_none());
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        let captures = RECORD.captures(line)?;
        let operation = Operation::from_char(captures["op"].chars().next()?)?;
        let address = u64::from_str_radix(&captures["address"], 16).ok()?;
        let size = captures["size"].parse::<u64>().ok()?;
        Some(Self { operation, address, size })
    }

    /// The block aligned addresses this record touches, in ascending order
    ///
    /// # Arguments
    ///
    /// * `line_size`: Bytes per cache line, a power of two
    ///
    /// returns: Blocks
    pub fn blocks(&self, line_size: u64) -> Blocks {
        Blocks::new(self.address, self.size, line_size)
    }
}

impl Display for TraceRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:x},{}", self.operation.as_char(), self.address, self.size)
    }
}

/// Iterator over the start addresses of every line an access of `size` bytes at `address` touches
///
/// Starts at the address rounded down to its line, and steps one line at a time while still below
/// `address + size`. A size of zero touches nothing. Addresses saturate at the top of the address
/// space instead of wrapping.
#[derive(Debug, Clone)]
pub struct Blocks {
    next: Option<u64>,
    end: u64,
    line_size: u64,
}

impl Blocks {
    /// # Panics
    ///
    /// Panics if `line_size` is zero. A validated [`crate::geometry::Geometry`] never has one.
    pub fn new(address: u64, size: u64, line_size: u64) -> Self {
        Self {
            next: Some(address - (address % line_size)),
            end: address.saturating_add(size),
            line_size,
        }
    }
}

impl Iterator for Blocks {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let current = self.next.filter(|&i| i < self.end)?;
        self.next = current.checked_add(self.line_size);
        Some(current)
    }
}
