//! Goldbach partition counts grouped by `E mod 6`.

use crate::error::{CoreError, Result};
use crate::primes::PrimeTable;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldbachClass {
    pub residue: u64,
    pub evens: u64,
    pub partitions: u64,
    pub average: f64,
    /// `average` relative to the smallest class average
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldbachReport {
    pub limit: u64,
    pub classes: Vec<GoldbachClass>,
    /// avg(0 mod 6) / mean(avg(2 mod 6), avg(4 mod 6))
    pub clean_messy_ratio: f64,
}

/// Unordered partitions `E = p + q`, `p <= q`, both prime.
pub fn partitions(table: &PrimeTable, even: u64) -> u64 {
    table
        .as_slice()
        .iter()
        .take_while(|&&p| p <= even / 2)
        .filter(|&&p| table.contains(even - p))
        .count() as u64
}

pub fn goldbach_by_residue(table: &PrimeTable, limit: u64) -> Result<GoldbachReport> {
    if limit < 10 {
        return Err(CoreError::InvalidParameter(format!(
            "goldbach limit must be >= 10, got {}",
            limit
        )));
    }
    if table.largest().unwrap_or(0) < limit / 2 {
        return Err(CoreError::InsufficientPrimes {
            needed: table.count_up_to(limit / 2) + 1,
            available: table.len(),
        });
    }
    log::info!("Goldbach partitions for even numbers 6..={}", limit);

    let evens: Vec<u64> = (6..=limit).step_by(2).collect();
    let sums: [(u64, u64); 3] = evens
        .par_iter()
        .map(|&e| {
            let mut acc = [(0u64, 0u64); 3];
            let slot = &mut acc[((e % 6) / 2) as usize];
            slot.0 += 1;
            slot.1 += partitions(table, e);
            acc
        })
        .reduce(
            || [(0, 0); 3],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    x.0 += y.0;
                    x.1 += y.1;
                }
                a
            },
        );

    let averages: Vec<f64> = sums
        .iter()
        .map(|&(n, total)| if n == 0 { 0.0 } else { total as f64 / n as f64 })
        .collect();
    let base = averages.iter().copied().fold(f64::INFINITY, f64::min);

    let classes = sums
        .iter()
        .zip(&averages)
        .enumerate()
        .map(|(slot, (&(evens, partitions), &average))| GoldbachClass {
            residue: slot as u64 * 2,
            evens,
            partitions,
            average,
            scale: if base > 0.0 { average / base } else { 0.0 },
        })
        .collect();

    let messy = (averages[1] + averages[2]) / 2.0;
    Ok(GoldbachReport {
        limit,
        classes,
        clean_messy_ratio: if messy > 0.0 { averages[0] / messy } else { 0.0 },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_counts() {
        let table = PrimeTable::sieve(200);
        // 10 = 3+7 = 5+5
        assert_eq!(partitions(&table, 10), 2);
        // 100 = 3+97 11+89 17+83 29+71 41+59 47+53
        assert_eq!(partitions(&table, 100), 6);
        assert_eq!(partitions(&table, 4), 1);
    }

    #[test]
    fn test_multiples_of_six_have_about_twice_the_partitions() -> Result<()> {
        let table = PrimeTable::sieve(20_000);
        let report = goldbach_by_residue(&table, 20_000)?;
        assert_eq!(report.classes.len(), 3);
        assert_eq!(report.classes[0].residue, 0);
        let evens: u64 = report.classes.iter().map(|c| c.evens).sum();
        assert_eq!(evens, (20_000 - 6) / 2 + 1);
        assert!(
            report.clean_messy_ratio > 1.8 && report.clean_messy_ratio < 2.2,
            "{}",
            report.clean_messy_ratio
        );
        Ok(())
    }

    #[test]
    fn test_rejects_short_table() {
        let table = PrimeTable::sieve(100);
        assert!(goldbach_by_residue(&table, 10_000).is_err());
        assert!(goldbach_by_residue(&table, 4).is_err());
    }
}
