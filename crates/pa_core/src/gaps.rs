//! Gap census and the twin-prime constant estimate.

use crate::error::{CoreError, Result};
use crate::primes::PrimeTable;
use serde::{Deserialize, Serialize};

/// 2·C₂, twice the twin-prime constant.
pub const TWIN_CONSTANT_2C2: f64 = 1.320_323_6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapCounts {
    pub gaps: u64,
    pub twin: u64,
    pub cousin: u64,
    /// Consecutive primes 6 apart
    pub sexy: u64,
    /// Gap 2 followed by gap 4
    pub triplet_2_4: u64,
    /// Gap 4 followed by gap 2
    pub triplet_4_2: u64,
}

impl GapCounts {
    fn per_thousand(&self, n: u64) -> f64 {
        if self.gaps == 0 {
            0.0
        } else {
            n as f64 / self.gaps as f64 * 1000.0
        }
    }

    pub fn twin_density(&self) -> f64 {
        self.per_thousand(self.twin)
    }

    pub fn cousin_density(&self) -> f64 {
        self.per_thousand(self.cousin)
    }

    /// Every pair 6 apart, whether or not a prime sits between them.
    pub fn total_sexy_density(&self) -> f64 {
        self.per_thousand(self.sexy + self.triplet_2_4 + self.triplet_4_2)
    }

    pub fn sexy_twin_ratio(&self) -> f64 {
        let twin = self.twin_density();
        if twin > 0.0 {
            self.total_sexy_density() / twin
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapCheckpoint {
    pub gaps: u64,
    pub prime: u64,
    pub twin_density: f64,
    pub cousin_density: f64,
    pub sexy_twin_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapCensus {
    pub counts: GapCounts,
    pub twin_density: f64,
    pub cousin_density: f64,
    pub sexy_density: f64,
    pub sexy_twin_ratio: f64,
    pub checkpoints: Vec<GapCheckpoint>,
}

/// Count small gap patterns over the first `count` gaps of the table (all
/// of them when `None`).
pub fn gap_census(table: &PrimeTable, count: Option<usize>, checkpoint_every: usize) -> Result<GapCensus> {
    let available = table.len().saturating_sub(1);
    let n = count.unwrap_or(available);
    if n == 0 || n > available {
        return Err(CoreError::InsufficientPrimes {
            needed: n + 1,
            available: table.len(),
        });
    }
    log::info!("Gap census over {} gaps", n);

    let primes = table.as_slice();
    let mut counts = GapCounts::default();
    let mut checkpoints = Vec::new();
    let mut prev_gap = 0u64;

    for (i, pair) in primes.windows(2).take(n).enumerate() {
        let gap = pair[1] - pair[0];
        counts.gaps += 1;
        match gap {
            2 => counts.twin += 1,
            4 => counts.cousin += 1,
            6 => counts.sexy += 1,
            _ => {}
        }
        match (prev_gap, gap) {
            (2, 4) => counts.triplet_2_4 += 1,
            (4, 2) => counts.triplet_4_2 += 1,
            _ => {}
        }
        prev_gap = gap;

        if checkpoint_every > 0 && (i + 1) % checkpoint_every == 0 {
            checkpoints.push(GapCheckpoint {
                gaps: counts.gaps,
                prime: pair[1],
                twin_density: counts.twin_density(),
                cousin_density: counts.cousin_density(),
                sexy_twin_ratio: counts.sexy_twin_ratio(),
            });
        }
    }

    Ok(GapCensus {
        counts,
        twin_density: counts.twin_density(),
        cousin_density: counts.cousin_density(),
        sexy_density: counts.total_sexy_density(),
        sexy_twin_ratio: counts.sexy_twin_ratio(),
        checkpoints,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantEstimate {
    /// Number of gaps considered
    pub n: usize,
    /// The N-th prime
    pub prime: u64,
    pub twins: u64,
    pub density: f64,
    pub estimate: f64,
    pub deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwinConstantReport {
    pub estimates: Vec<ConstantEstimate>,
    pub mean: f64,
    pub spread: f64,
    pub stable: bool,
}

/// Twin density times `ln(p_N)` at each checkpoint, against 2·C₂.
pub fn twin_constant(table: &PrimeTable, checkpoints: &[usize]) -> Result<TwinConstantReport> {
    let mut ns: Vec<usize> = checkpoints.iter().copied().filter(|&n| n > 0).collect();
    ns.sort_unstable();
    ns.dedup();
    let Some(&largest) = ns.last() else {
        return Err(CoreError::InvalidParameter(
            "twin constant needs at least one positive checkpoint".to_string(),
        ));
    };
    table.require(largest + 1)?;

    let primes = table.as_slice();
    let mut twins = 0u64;
    let mut done = 0usize;
    let mut estimates = Vec::with_capacity(ns.len());
    for &n in &ns {
        twins += primes[done..=n]
            .windows(2)
            .filter(|w| w[1] - w[0] == 2)
            .count() as u64;
        done = n;

        let prime = primes[n - 1];
        let density = twins as f64 / n as f64;
        let estimate = density * (prime as f64).ln();
        estimates.push(ConstantEstimate {
            n,
            prime,
            twins,
            density,
            estimate,
            deviation: estimate - TWIN_CONSTANT_2C2,
        });
    }

    let mean = estimates.iter().map(|e| e.estimate).sum::<f64>() / estimates.len() as f64;
    let (lo, hi) = estimates
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
            (lo.min(e.estimate), hi.max(e.estimate))
        });
    let spread = hi - lo;

    Ok(TwinConstantReport {
        stable: spread < 0.1 && mean > 1.25 && mean < 1.4,
        estimates,
        mean,
        spread,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_census() -> Result<()> {
        // 2 3 5 7 11 13 17 19 23 29 31 37 41 43 47
        let table = PrimeTable::sieve(47);
        let census = gap_census(&table, None, 7)?;
        let c = census.counts;
        assert_eq!(c.gaps, 14);
        // (3,5) (5,7) (11,13) (17,19) (29,31) (41,43)
        assert_eq!(c.twin, 6);
        // (7,11) (13,17) (19,23) (37,41) (43,47)
        assert_eq!(c.cousin, 5);
        // (23,29) (31,37)
        assert_eq!(c.sexy, 2);
        // 5,7,11  11,13,17  17,19,23  41,43,47
        assert_eq!(c.triplet_2_4, 4);
        // 7,11,13  13,17,19  37,41,43
        assert_eq!(c.triplet_4_2, 3);
        assert_eq!(census.checkpoints.len(), 2);
        assert_eq!(census.checkpoints[0].prime, 19);
        Ok(())
    }

    #[test]
    fn test_sexy_twin_ratio_is_near_two() -> Result<()> {
        let table = PrimeTable::sieve_count(500_000);
        let census = gap_census(&table, None, 0)?;
        assert!(
            census.sexy_twin_ratio > 1.7 && census.sexy_twin_ratio < 2.3,
            "{}",
            census.sexy_twin_ratio
        );
        Ok(())
    }

    #[test]
    fn test_census_bounds() {
        let table = PrimeTable::sieve(100);
        assert!(gap_census(&table, Some(1000), 0).is_err());
        assert!(gap_census(&table, Some(0), 0).is_err());
    }

    #[test]
    fn test_twin_constant_estimates() -> Result<()> {
        let table = PrimeTable::sieve_count(1_000_001);
        let report = twin_constant(&table, &[1_000_000, 250_000, 500_000])?;
        assert_eq!(report.estimates.len(), 3);
        assert_eq!(report.estimates[0].n, 250_000);
        for e in &report.estimates {
            assert!(e.estimate > 1.2 && e.estimate < 1.6, "{:?}", e);
        }
        assert!(report.spread >= 0.0);
        assert!(twin_constant(&table, &[]).is_err());
        Ok(())
    }
}
