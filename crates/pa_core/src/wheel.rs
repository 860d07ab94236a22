//! Next-prime search: odd stepping against a mod-30 wheel.
//!
//! The benchmark compares the number of primality checks, not wall-clock
//! time. The wheel skips every multiple of 2, 3 and 5, so it spends 8 checks
//! per 30 integers against 15 for odd stepping.

use crate::error::{CoreError, Result};
use crate::primes::is_prime_u64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub const WHEEL_RESIDUES: [u64; 8] = [1, 7, 11, 13, 17, 19, 23, 29];
const WHEEL_STEPS: [u64; 8] = [6, 4, 2, 4, 2, 4, 6, 2];

/// Checks per 30 integers: odd stepping 15, wheel 8.
pub const THEORETICAL_REDUCTION: f64 = 15.0 / 8.0;

/// Span sampled above `start_min` by [`sample_starts`].
pub const SAMPLE_SPAN: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub prime: Option<u64>,
    pub checks: u64,
}

/// Test every odd number in `(n, n + pool]`.
pub fn next_prime_blind(n: u64, pool: u64, mut test: impl FnMut(u64) -> bool) -> SearchOutcome {
    let limit = n.saturating_add(pool);
    let mut candidate = n.checked_add(if n % 2 == 0 { 1 } else { 2 });
    let mut checks = 0;
    while let Some(c) = candidate.filter(|&c| c <= limit) {
        checks += 1;
        if test(c) {
            return SearchOutcome {
                prime: Some(c),
                checks,
            };
        }
        candidate = c.checked_add(2);
    }
    SearchOutcome { prime: None, checks }
}

/// Test only numbers in `(n, n + pool]` coprime to 30. Never returns 2, 3
/// or 5.
pub fn next_prime_wheel(n: u64, pool: u64, mut test: impl FnMut(u64) -> bool) -> SearchOutcome {
    let limit = n.saturating_add(pool);
    let base = n / 30 * 30;
    let offset = n % 30;
    // First spoke strictly above n; wraps to the next turn past residue 29
    let (mut spoke, mut candidate) = match WHEEL_RESIDUES.iter().position(|&r| r > offset) {
        Some(j) => (j, base.checked_add(WHEEL_RESIDUES[j])),
        None => (0, base.checked_add(31)),
    };

    // Candidates past u64::MAX end the search
    let mut checks = 0;
    while let Some(c) = candidate.filter(|&c| c <= limit) {
        checks += 1;
        if test(c) {
            return SearchOutcome {
                prime: Some(c),
                checks,
            };
        }
        candidate = c.checked_add(WHEEL_STEPS[spoke]);
        spoke = (spoke + 1) % WHEEL_STEPS.len();
    }
    SearchOutcome { prime: None, checks }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelReport {
    pub samples: usize,
    pub pool: u64,
    pub blind_checks: u64,
    pub wheel_checks: u64,
    pub reduction_factor: f64,
    pub theoretical: f64,
    /// Starts where the two searches disagreed
    pub mismatches: u64,
    /// Starts with no prime inside the pool
    pub not_found: u64,
}

/// Reproducible start values in `start_min ..= start_min + SAMPLE_SPAN`.
pub fn sample_starts(samples: usize, seed: u64, start_min: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..samples)
        .map(|_| rng.gen_range(start_min..=start_min.saturating_add(SAMPLE_SPAN)))
        .collect()
}

pub fn wheel_benchmark(starts: &[u64], pool: u64) -> Result<WheelReport> {
    if starts.is_empty() {
        return Err(CoreError::InvalidParameter("wheel benchmark needs samples".to_string()));
    }
    if let Some(&small) = starts.iter().find(|&&n| n < 5) {
        return Err(CoreError::InvalidParameter(format!(
            "wheel search skips 2, 3 and 5; start {} is too small",
            small
        )));
    }
    log::info!("Wheel benchmark over {} starts (pool {})", starts.len(), pool);

    let (blind_checks, wheel_checks, mismatches, not_found) = starts
        .par_iter()
        .map(|&n| {
            let blind = next_prime_blind(n, pool, is_prime_u64);
            let wheel = next_prime_wheel(n, pool, is_prime_u64);
            (
                blind.checks,
                wheel.checks,
                u64::from(blind.prime != wheel.prime),
                u64::from(blind.prime.is_none()),
            )
        })
        .reduce(
            || (0, 0, 0, 0),
            |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2, a.3 + b.3),
        );

    Ok(WheelReport {
        samples: starts.len(),
        pool,
        blind_checks,
        wheel_checks,
        reduction_factor: if wheel_checks == 0 {
            0.0
        } else {
            blind_checks as f64 / wheel_checks as f64
        },
        theoretical: THEORETICAL_REDUCTION,
        mismatches,
        not_found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::trial_division;

    #[test]
    fn test_searches_agree_on_small_starts() {
        for n in 5..2_000u64 {
            let blind = next_prime_blind(n, 210, trial_division);
            let wheel = next_prime_wheel(n, 210, trial_division);
            assert_eq!(blind.prime, wheel.prime, "n = {}", n);
            assert!(wheel.checks <= blind.checks, "n = {}", n);
        }
    }

    #[test]
    fn test_wheel_spokes() {
        let seen: Vec<u64> = {
            let mut out = Vec::new();
            next_prime_wheel(0, 60, |c| {
                out.push(c);
                false
            });
            out
        };
        assert_eq!(seen, vec![1, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 49, 53, 59]);
        // Wraps past residue 29
        let after = next_prime_wheel(29, 30, |_| true);
        assert_eq!(after.prime, Some(31));
    }

    #[test]
    fn test_search_stops_at_u64_max() {
        let n = u64::MAX - 3;
        let blind = next_prime_blind(n, 100, |_| false);
        assert_eq!(blind, SearchOutcome { prime: None, checks: 2 });
        let wheel = next_prime_wheel(n, 100, |_| false);
        assert_eq!(wheel, SearchOutcome { prime: None, checks: 1 });

        assert_eq!(next_prime_blind(n, 100, |_| true).prime, Some(u64::MAX - 2));
        assert_eq!(next_prime_wheel(u64::MAX - 1, 100, |_| true).prime, None);
    }

    #[test]
    fn test_benchmark_reduction_near_theory() -> Result<()> {
        let starts = sample_starts(2_000, 7, 10_000_000);
        assert_eq!(starts, sample_starts(2_000, 7, 10_000_000));
        let report = wheel_benchmark(&starts, 210)?;
        assert_eq!(report.mismatches, 0);
        assert!(
            (report.reduction_factor - THEORETICAL_REDUCTION).abs() < 0.25,
            "{}",
            report.reduction_factor
        );
        assert!(wheel_benchmark(&[3], 210).is_err());
        Ok(())
    }
}
