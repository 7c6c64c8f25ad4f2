use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Cursor};
use crate::io::{get_reader, open_trace};
use crate::simulator::{SimulationResult, Simulator};
use crate::util::get_cases;

#[test]
fn run_all_examples() -> Result<(), Box<dyn Error>> {
    let cases = get_cases()?;
    assert!(!cases.is_empty());
    for test in cases {
        println!("Running test for {}", test.name);
        let mut simulator = Simulator::new(test.config);
        let result = simulator.simulate(open_trace(&test.trace)?)?;
        assert_eq!(result, test.expected, "{}", test.name);
        let time = simulator.get_execution_time();
        println!("Success for {}, time: {}", test.name, time.as_nanos() as f64 / 1e9);
    }
    Ok(())
}

#[test]
fn mapped_and_buffered_readers_agree() -> Result<(), Box<dyn Error>> {
    for test in get_cases()? {
        let mapped = Simulator::new(test.config).simulate(get_reader(File::open(&test.trace)?)?)?;
        let buffered = Simulator::new(test.config).simulate(BufReader::new(File::open(&test.trace)?))?;
        assert_eq!(mapped, buffered, "{}", test.name);
    }
    Ok(())
}

#[test]
fn replaying_twice_gives_identical_counts() -> Result<(), Box<dyn Error>> {
    for test in get_cases()? {
        let first = Simulator::new(test.config).simulate(open_trace(&test.trace)?)?;
        let second = Simulator::new(test.config).simulate(open_trace(&test.trace)?)?;
        assert_eq!(first, second, "{}", test.name);
    }
    Ok(())
}

#[test]
fn empty_trace_file() -> Result<(), Box<dyn Error>> {
    let file = tempfile::NamedTempFile::new()?;
    let case = get_cases()?.remove(0);
    let result = Simulator::new(case.config).simulate(open_trace(file.path())?)?;
    assert_eq!(result, SimulationResult::default());
    Ok(())
}

#[test]
fn missing_trace_file() {
    let err = open_trace("/definitely/not/a/trace").err().unwrap();
    assert!(err.to_string().contains("/definitely/not/a/trace"));
}

#[test]
fn verbose_output() -> Result<(), Box<dyn Error>> {
    let case = get_cases()?
        .into_iter()
        .find(|c| c.name == "yi-s16-k2-b16-lru")
        .ok_or("missing yi case")?;
    let mut out = Vec::new();
    let trace = "I 0400d7d4,8\n L 10,1\n M 20,1\n L 22,1\n S 18,1\n L 110,1\n L 210,1\n M 12,1\n";
    let result = Simulator::new(case.config).simulate_verbose(Cursor::new(trace), &mut out)?;
    assert_eq!(result, case.expected);
    assert_eq!(
        String::from_utf8(out)?,
        "L 10,1 miss\n\
         M 20,1 miss hit\n\
         L 22,1 hit\n\
         S 18,1 hit\n\
         L 110,1 miss\n\
         L 210,1 miss eviction\n\
         M 12,1 miss eviction hit\n"
    );
    Ok(())
}

#[test]
fn simulate_accumulates_across_calls() -> Result<(), Box<dyn Error>> {
    let case = get_cases()?.into_iter().find(|c| c.name == "yi-s16-k2-b16-fifo").ok_or("missing yi case")?;
    let mut simulator = Simulator::new(case.config);
    let first = simulator.simulate(Cursor::new(" L 10,1\n"))?;
    assert_eq!(first, SimulationResult { hits: 0, misses: 1, evictions: 0 });
    // Cache stays warm
    let second = simulator.simulate(Cursor::new(" L 10,1\n"))?;
    assert_eq!(second, SimulationResult { hits: 1, misses: 1, evictions: 0 });
    assert_eq!(second.to_string(), "hits:1 misses:1 evictions:0");
    Ok(())
}
