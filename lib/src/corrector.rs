//! Counter-correction strategies applied to a finalized scanline series.

use crate::error::{Error, Result};
use crate::frame::{read_counter, with_counter};
use crate::series::Series;
use tracing::{debug, info};

/// Minimum multiplicity (exclusive) a counter must reach within a series before it is trusted to
/// extrapolate the next series' expected counter.
pub const CONSISTENCY_THRESHOLD: usize = 5;

/// Whether the sequential-consistency strategy requires `confident_counter + 1` to already
/// appear in the current series before rewriting to it. The reference implementation leaves
/// this unguarded; kept as a local constant so a future maintainer can arm the guard without
/// touching the state machine.
const REQUIRE_TARGET_PRESENT: bool = false;

/// Tracks the corrector's belief about the most recently finalized series' counter, used to
/// extrapolate the next series' expected value.
#[derive(Debug, Default)]
pub struct Corrector {
    confident_counter: Option<u32>,
}

impl Corrector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn confident_counter(&self) -> Option<u32> {
        self.confident_counter
    }

    /// Apply counter correction to `series`, returning the (possibly rewritten) series.
    ///
    /// # Errors
    /// [`Error::MalformedLineHeader`] if a stored frame's line header cannot be decoded, or
    /// [`Error::CodecInvariantViolation`] if a rewritten frame fails to re-decode to its target
    /// counter.
    pub fn correct(&mut self, mut series: Series) -> Result<Series> {
        let original_counters: Vec<u32> = series.entries().map(|e| e.counter).collect();

        if unique_count(&original_counters) > 1 {
            let target = match self.confident_counter {
                Some(confident)
                    if !REQUIRE_TARGET_PRESENT
                        || original_counters.contains(&(confident + 1)) =>
                {
                    let target = confident + 1;
                    info!(target, confident, "sequential-consistency correction");
                    target
                }
                _ => {
                    let target = mode(&original_counters);
                    debug!(target, "intra-series majority correction");
                    target
                }
            };
            series = rewrite_to(series, target)?;
        }

        self.update_confidence(&original_counters);
        Ok(series)
    }

    fn update_confidence(&mut self, counters: &[u32]) {
        let (candidate, multiplicity) = mode_with_count(counters);
        self.confident_counter = if multiplicity > CONSISTENCY_THRESHOLD {
            Some(candidate)
        } else {
            None
        };
    }
}

fn rewrite_to(mut series: Series, target: u32) -> Result<Series> {
    for entry in series.entries_mut() {
        if entry.counter == target {
            continue;
        }
        let rewritten = with_counter(&entry.frame, target)?;
        let new_counter = read_counter(&rewritten)?;
        if new_counter != target {
            return Err(Error::CodecInvariantViolation {
                expected: target,
                actual: new_counter,
            });
        }
        entry.frame = rewritten;
        entry.counter = new_counter;
    }
    Ok(series)
}

fn unique_count(counters: &[u32]) -> usize {
    let mut seen: Vec<u32> = Vec::new();
    for &c in counters {
        if !seen.contains(&c) {
            seen.push(c);
        }
    }
    seen.len()
}

/// Most frequent value, first occurrence wins ties (stable mode).
fn mode(counters: &[u32]) -> u32 {
    mode_with_count(counters).0
}

fn mode_with_count(counters: &[u32]) -> (u32, usize) {
    let mut counts: Vec<(u32, usize)> = Vec::new();
    for &c in counters {
        match counts.iter_mut().find(|(v, _)| *v == c) {
            Some(entry) => entry.1 += 1,
            None => counts.push((c, 1)),
        }
    }
    let mut best = counts[0];
    for &(value, count) in &counts[1..] {
        if count > best.1 {
            best = (value, count);
        }
    }
    best
}
