//! Correction radius scan
//!
//! Anchors with `S_n ≡ 0 (mod M)` are tested against Law I. When an anchor
//! fails, its nearest prime `q` is held fixed and neighbouring anchors
//! `S_{n±r}` are examined for `r = 1, 2, ...`; the failure is *resolved* at
//! the first radius where `|S_{n±r} - q|` is a clean distance.
//!
//! The report answers two questions over the scanned range:
//! - how large the correction radius ever needs to be (`r_max`), and how
//!   many failures stay unresolved within `max_radius`;
//! - how often the nearest prime sits within distance 1 of the anchor.

use crate::anchor::{anchor_at, is_clean_distance, law_one, LawOneStatus};
use crate::config::ScanConfig;
use crate::error::Result;
use crate::primes::PrimeTable;
use crate::scan::{fold_range, percent, resolve_range, Progress, ScanStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Radius the verdict is judged against.
pub const REFERENCE_RADIUS: usize = 10;

const MAX_EXAMPLES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedAnchor {
    pub index: usize,
    pub anchor: u64,
    pub nearest_prime: u64,
    pub distance: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "r_max")]
pub enum Verdict {
    /// Every failure resolved with `r_max < REFERENCE_RADIUS`
    RadiusBelow(usize),
    /// Every failure resolved with `r_max == REFERENCE_RADIUS`
    RadiusConfirmed(usize),
    /// Every failure resolved, but only beyond the reference radius
    RadiusAbove(usize),
    /// At least one failure stayed unresolved within `max_radius`
    Incomplete,
}

impl Verdict {
    fn judge(unresolved: u64, r_max: usize) -> Self {
        if unresolved > 0 {
            Verdict::Incomplete
        } else if r_max < REFERENCE_RADIUS {
            Verdict::RadiusBelow(r_max)
        } else if r_max == REFERENCE_RADIUS {
            Verdict::RadiusConfirmed(r_max)
        } else {
            Verdict::RadiusAbove(r_max)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestOffsetSummary {
    /// Anchors whose nearest prime is at distance 1
    pub within_one: u64,
    pub within_one_rate: f64,
    pub max_k_min: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionReport {
    pub modulus: u64,
    pub max_radius: usize,
    pub indices_scanned: usize,
    pub anchors_tested: u64,
    pub failures: u64,
    pub failure_rate: f64,
    pub resolved: u64,
    pub unresolved: u64,
    /// Anchors skipped because no prime was found within `max_distance`
    pub unbounded: u64,
    pub resolution_rate: f64,
    pub r_max: usize,
    pub radius_histogram: BTreeMap<usize, u64>,
    pub nearest_offset: NearestOffsetSummary,
    pub unresolved_examples: Vec<UnresolvedAnchor>,
    pub verdict: Verdict,
}

#[derive(Default)]
struct CorrectionStats {
    anchors: u64,
    failures: u64,
    resolved: u64,
    unresolved: u64,
    unbounded: u64,
    r_max: usize,
    histogram: BTreeMap<usize, u64>,
    within_one: u64,
    max_k_min: u64,
    examples: Vec<UnresolvedAnchor>,
}

impl ScanStats for CorrectionStats {
    fn merge(&mut self, later: Self) {
        self.anchors += later.anchors;
        self.failures += later.failures;
        self.resolved += later.resolved;
        self.unresolved += later.unresolved;
        self.unbounded += later.unbounded;
        self.r_max = self.r_max.max(later.r_max);
        for (r, n) in later.histogram {
            *self.histogram.entry(r).or_default() += n;
        }
        self.within_one += later.within_one;
        self.max_k_min = self.max_k_min.max(later.max_k_min);
        if self.examples.len() < MAX_EXAMPLES {
            let room = MAX_EXAMPLES - self.examples.len();
            self.examples.extend(later.examples.into_iter().take(room));
        }
    }
}

/// Smallest radius at which a neighbouring anchor is a clean distance from
/// `q`.
pub fn correction_radius(table: &PrimeTable, index: usize, q: u64, max_radius: usize) -> Option<usize> {
    (1..=max_radius).find(|&r| {
        let before = index
            .checked_sub(r)
            .and_then(|j| anchor_at(table, j))
            .map(|s| is_clean_distance(table, s.abs_diff(q)))
            .unwrap_or(false);
        let after = anchor_at(table, index + r)
            .map(|s| is_clean_distance(table, s.abs_diff(q)))
            .unwrap_or(false);
        before || after
    })
}

/// Run the correction radius scan for anchors divisible by `config.modulus`.
pub fn scan(table: &PrimeTable, config: &ScanConfig) -> Result<CorrectionReport> {
    config.validate()?;
    let modulus = config.modulus;
    let max_radius = config.max_radius;

    let range = resolve_range(
        table.len(),
        config.start_index + max_radius,
        config.count,
        max_radius,
        max_radius + 1,
    )?;
    let indices_scanned = range.len();
    log::info!(
        "Correction scan: anchors = 0 mod {}, radius <= {}, indices {}..{}",
        modulus,
        max_radius,
        range.start,
        range.end
    );

    let progress = Progress::new("correction", indices_scanned, config.progress_interval);
    let stats = fold_range(range, config.parallel, &progress, |s: &mut CorrectionStats, i| {
        let Some(anchor) = anchor_at(table, i) else {
            return;
        };
        if anchor % modulus != 0 {
            return;
        }
        s.anchors += 1;

        let status = law_one(table, anchor, config.max_distance);
        if let Some(nearest) = status.nearest() {
            if nearest.distance <= 1 {
                s.within_one += 1;
            }
            s.max_k_min = s.max_k_min.max(nearest.distance);
        }

        match status {
            LawOneStatus::Clean(_) => {}
            LawOneStatus::Unbounded => s.unbounded += 1,
            LawOneStatus::Failure(nearest) => {
                s.failures += 1;
                match correction_radius(table, i, nearest.prime, max_radius) {
                    Some(r) => {
                        s.resolved += 1;
                        s.r_max = s.r_max.max(r);
                        *s.histogram.entry(r).or_default() += 1;
                    }
                    None => {
                        s.unresolved += 1;
                        if s.examples.len() < MAX_EXAMPLES {
                            s.examples.push(UnresolvedAnchor {
                                index: i,
                                anchor,
                                nearest_prime: nearest.prime,
                                distance: nearest.distance,
                            });
                        }
                    }
                }
            }
        }
    });

    let resolution_rate = if stats.failures == 0 {
        100.0
    } else {
        percent(stats.resolved, stats.failures)
    };
    let verdict = Verdict::judge(stats.unresolved, stats.r_max);
    log::info!(
        "Correction scan done: {} anchors, {} failures, r_max = {}, verdict {:?}",
        stats.anchors,
        stats.failures,
        stats.r_max,
        verdict
    );

    Ok(CorrectionReport {
        modulus,
        max_radius,
        indices_scanned,
        anchors_tested: stats.anchors,
        failures: stats.failures,
        failure_rate: percent(stats.failures, stats.anchors),
        resolved: stats.resolved,
        unresolved: stats.unresolved,
        unbounded: stats.unbounded,
        resolution_rate,
        r_max: stats.r_max,
        radius_histogram: stats.histogram,
        nearest_offset: NearestOffsetSummary {
            within_one: stats.within_one,
            within_one_rate: percent(stats.within_one, stats.anchors),
            max_k_min: stats.max_k_min,
        },
        unresolved_examples: stats.examples,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::k_min;

    fn config(modulus: u64) -> ScanConfig {
        ScanConfig {
            modulus,
            ..Default::default()
        }
    }

    #[test]
    fn test_counts_are_consistent() -> Result<()> {
        let table = PrimeTable::sieve(3_000_000);
        let report = scan(&table, &config(210))?;
        assert!(report.anchors_tested > 0);
        assert_eq!(
            report.failures,
            report.resolved + report.unresolved,
            "every failure is either resolved or not"
        );
        let hist_total: u64 = report.radius_histogram.values().sum();
        assert_eq!(hist_total, report.resolved);
        if let Some((&largest, _)) = report.radius_histogram.iter().next_back() {
            assert_eq!(largest, report.r_max);
        }
        assert!(report.nearest_offset.within_one <= report.anchors_tested);
        Ok(())
    }

    #[test]
    fn test_against_brute_force() -> Result<()> {
        let table = PrimeTable::sieve(400_000);
        let cfg = ScanConfig {
            modulus: 6,
            max_radius: 5,
            parallel: false,
            ..Default::default()
        };
        let report = scan(&table, &cfg)?;

        let p = table.as_slice();
        let s = |j: usize| p[j] + p[j + 1];
        let clean = |k: u64| k == 1 || table.contains(k);
        let (mut anchors, mut failures, mut unresolved) = (0u64, 0u64, 0u64);
        let (mut within_one, mut max_k_min, mut r_max) = (0u64, 0u64, 0usize);
        let mut histogram: BTreeMap<usize, u64> = BTreeMap::new();
        let start = cfg.start_index + cfg.max_radius;
        for i in start..p.len() - cfg.max_radius - 1 {
            if s(i) % 6 != 0 {
                continue;
            }
            anchors += 1;
            let nearest = k_min(&table, s(i), cfg.max_distance).unwrap();
            if nearest.distance <= 1 {
                within_one += 1;
            }
            max_k_min = max_k_min.max(nearest.distance);
            if clean(nearest.distance) {
                continue;
            }
            failures += 1;
            let fixed = (1..=cfg.max_radius).find(|&r| {
                clean(s(i - r).abs_diff(nearest.prime)) || clean(s(i + r).abs_diff(nearest.prime))
            });
            match fixed {
                Some(r) => {
                    r_max = r_max.max(r);
                    *histogram.entry(r).or_default() += 1;
                }
                None => unresolved += 1,
            }
        }
        assert_eq!(report.anchors_tested, anchors);
        assert_eq!(report.failures, failures);
        assert_eq!(report.unresolved, unresolved);
        assert_eq!(report.r_max, r_max);
        assert_eq!(report.radius_histogram, histogram);
        assert_eq!(report.nearest_offset.within_one, within_one);
        assert_eq!(report.nearest_offset.max_k_min, max_k_min);
        assert!(failures > 0 && max_k_min > 1);
        Ok(())
    }

    #[test]
    fn test_parallel_matches_sequential() -> Result<()> {
        let table = PrimeTable::sieve(1_000_000);
        let mut cfg = config(30);
        let par = scan(&table, &cfg)?;
        cfg.parallel = false;
        let seq = scan(&table, &cfg)?;
        assert_eq!(par, seq);
        Ok(())
    }

    #[test]
    fn test_verdicts() {
        assert_eq!(Verdict::judge(0, 1), Verdict::RadiusBelow(1));
        assert_eq!(Verdict::judge(0, 10), Verdict::RadiusConfirmed(10));
        assert_eq!(Verdict::judge(0, 16), Verdict::RadiusAbove(16));
        assert_eq!(Verdict::judge(3, 1), Verdict::Incomplete);
    }

    #[test]
    fn test_insufficient_table() {
        let table = PrimeTable::sieve(100);
        assert!(scan(&table, &config(210)).unwrap_err().is_capacity());
    }
}
