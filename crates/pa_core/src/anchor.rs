//! Anchors and the Law I test
//!
//! An anchor is the sum of two consecutive primes, `S_n = p_n + p_{n+1}`.
//! Its *nearest prime distance* `k_min` is the smallest `k >= 1` such that
//! `S_n - k` or `S_n + k` is prime. Law I holds ("clean") when `k_min` is 1
//! or a prime; a composite `k_min` is a structural failure.

use crate::primes::PrimeTable;
use serde::{Deserialize, Serialize};

/// The primorial anchor modulus (2 * 3 * 5 * 7).
pub const PRIMORIAL_210: u64 = 210;

/// `p_i + p_{i+1}`, or `None` past the end of the table.
#[inline]
pub fn anchor_at(table: &PrimeTable, i: usize) -> Option<u64> {
    let slice = table.as_slice();
    Some(*slice.get(i)? + *slice.get(i + 1)?)
}

#[inline(always)]
pub fn residue(anchor: u64, modulus: u64) -> u64 {
    anchor % modulus
}

/// Closest prime to an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearestPrime {
    pub distance: u64,
    pub prime: u64,
}

/// Search outward from `anchor`. The lower neighbour wins a tie.
pub fn k_min(table: &PrimeTable, anchor: u64, max_distance: u64) -> Option<NearestPrime> {
    for k in 1..=max_distance {
        if let Some(lower) = anchor.checked_sub(k) {
            if table.contains(lower) {
                return Some(NearestPrime {
                    distance: k,
                    prime: lower,
                });
            }
        }
        let upper = anchor + k;
        if table.contains(upper) {
            return Some(NearestPrime {
                distance: k,
                prime: upper,
            });
        }
    }
    None
}

/// `k == 1` or `k` prime.
#[inline]
pub fn is_clean_distance(table: &PrimeTable, k: u64) -> bool {
    k == 1 || table.contains(k)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LawOneStatus {
    Clean(NearestPrime),
    Failure(NearestPrime),
    /// No prime within the search cap.
    Unbounded,
}

impl LawOneStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, LawOneStatus::Failure(_))
    }

    pub fn nearest(&self) -> Option<NearestPrime> {
        match self {
            LawOneStatus::Clean(n) | LawOneStatus::Failure(n) => Some(*n),
            LawOneStatus::Unbounded => None,
        }
    }
}

pub fn law_one(table: &PrimeTable, anchor: u64, max_distance: u64) -> LawOneStatus {
    match k_min(table, anchor, max_distance) {
        Some(nearest) if is_clean_distance(table, nearest.distance) => {
            LawOneStatus::Clean(nearest)
        }
        Some(nearest) => LawOneStatus::Failure(nearest),
        None => LawOneStatus::Unbounded,
    }
}

/// Depth of an anchor in the 6 | 30 | 210 hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StructuralClass {
    /// 0 mod 210
    Vacuum,
    /// 0 mod 30, not 0 mod 210
    Mod30Echo,
    /// 0 mod 6, not 0 mod 30
    Mod6Echo,
    Messy,
}

impl StructuralClass {
    pub const ALL: [StructuralClass; 4] = [
        StructuralClass::Vacuum,
        StructuralClass::Mod30Echo,
        StructuralClass::Mod6Echo,
        StructuralClass::Messy,
    ];

    pub fn of(anchor: u64) -> Self {
        let r = anchor % PRIMORIAL_210;
        if r == 0 {
            StructuralClass::Vacuum
        } else if r % 30 == 0 {
            StructuralClass::Mod30Echo
        } else if r % 6 == 0 {
            StructuralClass::Mod6Echo
        } else {
            StructuralClass::Messy
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StructuralClass::Vacuum => "vacuum",
            StructuralClass::Mod30Echo => "mod30_echo",
            StructuralClass::Mod6Echo => "mod6_echo",
            StructuralClass::Messy => "messy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PrimeTable {
        PrimeTable::sieve(2000)
    }

    #[test]
    fn test_anchor_at() {
        let t = table();
        assert_eq!(anchor_at(&t, 0), Some(5)); // 2 + 3
        assert_eq!(anchor_at(&t, 3), Some(18)); // 7 + 11
        assert_eq!(anchor_at(&t, t.len() - 1), None);
    }

    #[test]
    fn test_k_min_prefers_lower_on_tie() {
        let t = table();
        // 18: 17 and 19 are both at distance 1
        assert_eq!(
            k_min(&t, 18, 100),
            Some(NearestPrime {
                distance: 1,
                prime: 17
            })
        );
        // 120: 119 = 7*17, 121 = 11^2, 118, 122 even, 117 = 9*13, 123 = 3*41,
        // 116, 124 even, 115, 125 = 5^3, 114, 126 even, 113 prime
        assert_eq!(
            k_min(&t, 120, 100),
            Some(NearestPrime {
                distance: 7,
                prime: 113
            })
        );
    }

    #[test]
    fn test_law_one() {
        let t = table();
        // 120 -> k = 7, prime -> clean
        assert!(matches!(law_one(&t, 120, 100), LawOneStatus::Clean(_)));
        // Inside the 1327..1361 gap, 1336 sits 9 away from 1327
        assert!(law_one(&t, 1336, 100).is_failure());
        let failing = (10..1800u64)
            .step_by(2)
            .find(|&s| law_one(&t, s, 100).is_failure())
            .unwrap();
        let n = law_one(&t, failing, 100).nearest().unwrap();
        assert!(n.distance > 1 && !t.contains(n.distance));
        assert_eq!(law_one(&t, 120, 3), LawOneStatus::Unbounded);
    }

    #[test]
    fn test_structural_class() {
        assert_eq!(StructuralClass::of(420), StructuralClass::Vacuum);
        assert_eq!(StructuralClass::of(60), StructuralClass::Mod30Echo);
        assert_eq!(StructuralClass::of(36), StructuralClass::Mod6Echo);
        assert_eq!(StructuralClass::of(38), StructuralClass::Messy);
    }

    #[cfg(all(test, feature = "proptest"))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// No prime lies strictly closer to the anchor than k_min
            #[test]
            fn prop_k_min_is_nearest(s in 4u64..200_000) {
                let t = PrimeTable::sieve(1_000);
                if let Some(n) = k_min(&t, s, 2000) {
                    prop_assert!(t.contains(n.prime));
                    prop_assert_eq!(n.prime.abs_diff(s), n.distance);
                    for k in 1..n.distance {
                        prop_assert!(!t.contains(s - k) && !t.contains(s + k));
                    }
                }
            }

            /// Class membership follows divisibility
            #[test]
            fn prop_structural_class_divides(s in 0u64..10_000_000) {
                match StructuralClass::of(s) {
                    StructuralClass::Vacuum => prop_assert_eq!(s % 210, 0),
                    StructuralClass::Mod30Echo => prop_assert!(s % 30 == 0 && s % 210 != 0),
                    StructuralClass::Mod6Echo => prop_assert!(s % 6 == 0 && s % 30 != 0),
                    StructuralClass::Messy => prop_assert!(s % 6 != 0),
                }
            }
        }
    }
}
