//! Twin-prime search restricted to `p ≡ 5 (mod 6)`.
//!
//! Every twin pair above (3, 5) has the form (6k−1, 6k+1), so checking only
//! primes that are 5 mod 6 finds the same pairs with roughly half the work.

use crate::error::{CoreError, Result};
use crate::primes::PrimeTable;
use crate::scan::percent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SniperReport {
    pub target: usize,
    pub found: usize,
    pub blind_checks: u64,
    pub filtered_checks: u64,
    pub skipped_checks: u64,
    /// Pairs below the 6k±1 regime, found without a check
    pub small_pairs: usize,
    pub reduction: f64,
    pub pairs_match: bool,
    pub last_pair: Option<(u64, u64)>,
}

struct Hunt {
    pairs: Vec<(u64, u64)>,
    checks: u64,
    skipped: u64,
    small: usize,
}

fn hunt(table: &PrimeTable, target: usize, filtered: bool) -> Hunt {
    let mut out = Hunt {
        pairs: Vec::with_capacity(target),
        checks: 0,
        skipped: 0,
        small: 0,
    };
    let primes = table.as_slice();
    for &p in primes {
        if out.pairs.len() >= target {
            break;
        }
        let Some(largest) = table.largest() else {
            break;
        };
        if p + 2 > largest {
            break;
        }
        if filtered && p <= 3 {
            if p == 3 {
                out.pairs.push((3, 5));
                out.small += 1;
            }
            continue;
        }
        if filtered && p % 6 != 5 {
            out.skipped += 1;
            continue;
        }
        out.checks += 1;
        if table.contains(p + 2) {
            out.pairs.push((p, p + 2));
        }
    }
    out
}

pub fn twin_sniper(table: &PrimeTable, target: usize) -> Result<SniperReport> {
    if target == 0 {
        return Err(CoreError::InvalidParameter("sniper target must be >= 1".to_string()));
    }
    let blind = hunt(table, target, false);
    let filtered = hunt(table, target, true);
    if blind.pairs.len() < target {
        log::warn!(
            "Only {} twin pairs below {}; load more primes to reach {}",
            blind.pairs.len(),
            table.largest().unwrap_or(0),
            target
        );
    }

    Ok(SniperReport {
        target,
        found: filtered.pairs.len(),
        blind_checks: blind.checks,
        filtered_checks: filtered.checks,
        skipped_checks: filtered.skipped,
        small_pairs: filtered.small,
        reduction: 100.0 - percent(filtered.checks, blind.checks),
        pairs_match: blind.pairs == filtered.pairs,
        last_pair: filtered.pairs.last().copied(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_target() -> Result<()> {
        let table = PrimeTable::sieve(100);
        let report = twin_sniper(&table, 4)?;
        // (3,5) (5,7) (11,13) (17,19)
        assert!(report.pairs_match);
        assert_eq!(report.found, 4);
        assert_eq!(report.small_pairs, 1);
        assert_eq!(report.last_pair, Some((17, 19)));
        // Blind checks 2 3 5 7 11 13 17; filtered checks 5 11 17
        assert_eq!(report.blind_checks, 7);
        assert_eq!(report.filtered_checks, 3);
        assert_eq!(report.skipped_checks, 2);
        Ok(())
    }

    #[test]
    fn test_halves_the_workload() -> Result<()> {
        let table = PrimeTable::sieve(2_000_000);
        let report = twin_sniper(&table, 10_000)?;
        assert!(report.pairs_match);
        assert_eq!(report.found, 10_000);
        assert!(report.reduction > 49.0, "{}", report.reduction);
        Ok(())
    }

    #[test]
    fn test_zero_target() {
        assert!(twin_sniper(&PrimeTable::sieve(10), 0).is_err());
    }
}
