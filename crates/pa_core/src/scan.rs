//! Index-range scanning shared by the whole-table analyses.
//!
//! Each analysis keeps its counters in a type implementing [`ScanStats`];
//! [`fold_range`] visits every index either sequentially or with rayon and
//! merges per-thread partials. Merging is order-preserving, so reports are
//! identical on both paths.

use crate::error::{CoreError, Result};
use rayon::prelude::*;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

pub trait ScanStats: Default + Send {
    /// Absorb the statistics of the range immediately after `self`.
    fn merge(&mut self, later: Self);
}

/// Resolve `[start, start + count)` so that `lookbehind` indices before and
/// `lookahead` indices after every visited index exist.
pub fn resolve_range(
    table_len: usize,
    start: usize,
    count: Option<usize>,
    lookbehind: usize,
    lookahead: usize,
) -> Result<Range<usize>> {
    let first = start.max(lookbehind);
    let last_allowed = table_len.saturating_sub(lookahead);
    match count {
        Some(count) => {
            let end = first + count;
            if end > last_allowed {
                return Err(CoreError::InsufficientPrimes {
                    needed: end + lookahead,
                    available: table_len,
                });
            }
            Ok(first..end)
        }
        None => {
            if first >= last_allowed {
                return Err(CoreError::InsufficientPrimes {
                    needed: first + lookahead + 1,
                    available: table_len,
                });
            }
            Ok(first..last_allowed)
        }
    }
}

/// Throttled progress logging that is safe to call from rayon workers.
pub struct Progress<'a> {
    label: &'a str,
    total: usize,
    interval: usize,
    done: AtomicUsize,
}

impl<'a> Progress<'a> {
    pub fn new(label: &'a str, total: usize, interval: usize) -> Self {
        Self {
            label,
            total,
            interval: interval.max(1),
            done: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn tick(&self) {
        let n = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if n % self.interval == 0 {
            log::info!("{}: {} / {}", self.label, n, self.total);
        }
    }
}

pub fn fold_range<S, F>(range: Range<usize>, parallel: bool, progress: &Progress, visit: F) -> S
where
    S: ScanStats,
    F: Fn(&mut S, usize) + Sync,
{
    if parallel {
        range
            .into_par_iter()
            .fold(S::default, |mut stats, i| {
                visit(&mut stats, i);
                progress.tick();
                stats
            })
            .reduce(S::default, |mut a, b| {
                a.merge(b);
                a
            })
    } else {
        let mut stats = S::default();
        for i in range {
            visit(&mut stats, i);
            progress.tick();
        }
        stats
    }
}

/// Percentage with a zero-denominator guard.
#[inline]
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect(Vec<usize>);

    impl ScanStats for Collect {
        fn merge(&mut self, later: Self) {
            self.0.extend(later.0);
        }
    }

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(100, 10, Some(20), 0, 2).unwrap(), 10..30);
        assert_eq!(resolve_range(100, 10, None, 25, 26).unwrap(), 25..74);
        assert!(resolve_range(100, 10, Some(89), 0, 2)
            .unwrap_err()
            .is_capacity());
        assert!(resolve_range(5, 10, None, 0, 1).is_err());
    }

    #[test]
    fn test_parallel_fold_preserves_order() {
        let progress = Progress::new("test", 1000, 1000);
        let seq: Collect = fold_range(0..1000, false, &progress, |s: &mut Collect, i| s.0.push(i));
        let par: Collect = fold_range(0..1000, true, &progress, |s: &mut Collect, i| s.0.push(i));
        assert_eq!(seq.0, par.0);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 4), 25.0);
        assert_eq!(percent(3, 0), 0.0);
    }
}
