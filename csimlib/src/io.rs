use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use crate::error::SimError;

// Traces are read line by line, a large buffer keeps the number of reads down
const BUFFER_SIZE: usize = 64 * 4096;

/// Opens a trace file for reading
pub fn open_trace<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, SimError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SimError::Open {
        path: path.display().to_string(),
        source,
    })?;
    get_reader(file)
}

/// Wraps a trace file in a line reader
///
/// On unix the file is memory mapped with sequential access advice, elsewhere (and for empty files,
/// which can't be mapped) it falls back to a buffered reader
pub fn get_reader(file: File) -> Result<Box<dyn BufRead>, SimError> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, file)))
    }
    // Memory map the file for speed on unix systems
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        if file.metadata()?.len() == 0 {
            return Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, file)));
        }
        // The map is private to this reader, the file isn't expected to change while replaying
        let m = unsafe { Mmap::map(&file)? };
        m.advise(Advice::Sequential)?;
        Ok(Box::new(Cursor::new(m)))
    }
}
