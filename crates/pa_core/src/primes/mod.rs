//! Prime tables
//!
//! `PrimeTable` is the shared input of every analysis: the ascending list of
//! consecutive primes starting at 2, plus a bitmap for O(1) membership tests
//! up to `bound`. Lookups above the bound fall back to Miller-Rabin, so
//! anchor searches near the end of the table stay exact.

pub mod io;
pub mod primality;
pub mod sieve;

pub use io::{load_text, read_u64_lines, write_text};
pub use primality::{is_prime_u64, primorial_filter, trial_division};
pub use sieve::nth_prime_upper_bound;

use crate::error::{CoreError, Result};

/// Bit-packed boolean table indexed by integer value.
#[derive(Debug, Clone)]
pub(crate) struct PrimeBits {
    words: Vec<u64>,
    bound: u64,
}

impl PrimeBits {
    pub(crate) fn all_set(bound: u64) -> Self {
        let n_words = (bound / 64 + 1) as usize;
        Self {
            words: vec![u64::MAX; n_words],
            bound,
        }
    }

    pub(crate) fn empty(bound: u64) -> Self {
        let n_words = (bound / 64 + 1) as usize;
        Self {
            words: vec![0; n_words],
            bound,
        }
    }

    #[inline(always)]
    pub(crate) fn get(&self, n: u64) -> bool {
        self.words[(n / 64) as usize] & (1u64 << (n % 64)) != 0
    }

    #[inline(always)]
    pub(crate) fn set(&mut self, n: u64) {
        self.words[(n / 64) as usize] |= 1u64 << (n % 64);
    }

    #[inline(always)]
    pub(crate) fn clear(&mut self, n: u64) {
        self.words[(n / 64) as usize] &= !(1u64 << (n % 64));
    }
}

/// Consecutive primes `2, 3, 5, ...` with constant-time membership.
#[derive(Debug, Clone)]
pub struct PrimeTable {
    primes: Vec<u64>,
    bits: PrimeBits,
}

impl PrimeTable {
    /// All primes `<= limit`.
    pub fn sieve(limit: u64) -> Self {
        let bits = sieve::sieve_bits(limit);
        let primes: Vec<u64> = (2..=limit).filter(|&n| bits.get(n)).collect();
        log::debug!("Sieved {} primes up to {}", primes.len(), limit);
        Self { primes, bits }
    }

    /// Exactly the first `n` primes.
    ///
    /// The bitmap keeps the full sieve bound, so `contains` stays exact past
    /// the last listed prime.
    pub fn sieve_count(n: usize) -> Self {
        let mut table = Self::sieve(nth_prime_upper_bound(n));
        table.primes.truncate(n);
        table
    }

    /// Build from an explicit list.
    ///
    /// The list must start at 2 and be strictly ascending. Completeness
    /// (no skipped primes) is assumed, as it is for any sieve output.
    pub fn from_primes(primes: Vec<u64>) -> Result<Self> {
        if let Some(&first) = primes.first() {
            if first != 2 {
                return Err(CoreError::InvalidParameter(format!(
                    "prime list must start at 2, starts at {}",
                    first
                )));
            }
        }
        if let Some(pos) = primes.windows(2).position(|w| w[0] >= w[1]) {
            return Err(CoreError::UnsortedInput { line: pos + 2 });
        }

        let bound = primes.last().copied().unwrap_or(0);
        let mut bits = PrimeBits::empty(bound);
        for &p in &primes {
            bits.set(p);
        }
        Ok(Self { primes, bits })
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    /// The i-th prime (0-based: `get(0) == Some(2)`).
    pub fn get(&self, i: usize) -> Option<u64> {
        self.primes.get(i).copied()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.primes
    }

    pub fn into_vec(self) -> Vec<u64> {
        self.primes
    }

    /// Largest integer covered by the bitmap.
    pub fn bound(&self) -> u64 {
        self.bits.bound
    }

    pub fn largest(&self) -> Option<u64> {
        self.primes.last().copied()
    }

    /// Exact primality for any `n`.
    #[inline]
    pub fn contains(&self, n: u64) -> bool {
        if n <= self.bits.bound {
            self.bits.get(n)
        } else {
            is_prime_u64(n)
        }
    }

    /// Fail unless at least `n` primes are present.
    pub fn require(&self, n: usize) -> Result<()> {
        if self.primes.len() < n {
            return Err(CoreError::InsufficientPrimes {
                needed: n,
                available: self.primes.len(),
            });
        }
        Ok(())
    }

    /// Number of primes `<= x` (pi(x)) within the table.
    pub fn count_up_to(&self, x: u64) -> usize {
        self.primes.partition_point(|&p| p <= x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sieve_and_lookup() {
        let table = PrimeTable::sieve(100);
        assert_eq!(table.len(), 25);
        assert_eq!(table.get(0), Some(2));
        assert_eq!(table.largest(), Some(97));
        assert!(table.contains(97));
        assert!(!table.contains(91));
        // Past the bitmap falls back to Miller-Rabin
        assert!(table.contains(101));
        assert!(!table.contains(1001));
    }

    #[test]
    fn test_sieve_count() {
        let table = PrimeTable::sieve_count(1000);
        assert_eq!(table.len(), 1000);
        assert_eq!(table.largest(), Some(7919));
        assert!(table.contains(7927));

        let million = PrimeTable::sieve_count(1_000_000);
        assert_eq!(million.len(), 1_000_000);
        assert_eq!(million.largest(), Some(15_485_863));
    }

    #[test]
    fn test_from_primes_validation() {
        assert!(PrimeTable::from_primes(vec![2, 3, 5, 7]).is_ok());
        assert!(matches!(
            PrimeTable::from_primes(vec![3, 5, 7]),
            Err(CoreError::InvalidParameter(_))
        ));
        assert!(matches!(
            PrimeTable::from_primes(vec![2, 3, 7, 5]),
            Err(CoreError::UnsortedInput { line: 4 })
        ));
    }

    #[test]
    fn test_from_primes_matches_sieve() {
        let sieved = PrimeTable::sieve(500);
        let rebuilt = PrimeTable::from_primes(sieved.as_slice().to_vec()).unwrap();
        for n in 0..=600 {
            assert_eq!(sieved.contains(n), rebuilt.contains(n), "n = {}", n);
        }
    }

    #[test]
    fn test_require_and_count() {
        let table = PrimeTable::sieve(50);
        assert!(table.require(15).is_ok());
        assert!(table.require(16).unwrap_err().is_capacity());
        assert_eq!(table.count_up_to(10), 4);
        assert_eq!(table.count_up_to(11), 5);
    }
}
