//! Single-number primality tests.
//!
//! `is_prime_u64` is exact for the whole `u64` range; the other two exist as
//! the slow reference and the cheap pre-filter used by the pool generator.

/// Witness set that makes Miller-Rabin deterministic below 2^64.
const MR_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Primes covered by [`primorial_filter`]. P_5# = 2310 already exceeds the
/// default 210 candidate pool; 13 is kept for margin.
pub const PRIMORIAL_FILTER_PRIMES: [u64; 6] = [2, 3, 5, 7, 11, 13];

#[inline(always)]
fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1u64;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}

/// Deterministic Miller-Rabin primality test.
pub fn is_prime_u64(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &MR_BASES {
        if n % p == 0 {
            return n == p;
        }
    }

    let mut d = n - 1;
    let mut s = 0u32;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }

    'witness: for &a in &MR_BASES {
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// 6k±1 trial division.
pub fn trial_division(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5u64;
    while i.saturating_mul(i) <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Returns true when `n` is certainly composite by a small primorial factor.
///
/// A `false` result only means "candidate": numbers whose smallest factor is
/// above 13 pass the filter.
pub fn primorial_filter(n: u64) -> bool {
    if n < 2 {
        return true;
    }
    PRIMORIAL_FILTER_PRIMES
        .iter()
        .any(|&p| n % p == 0 && n != p)
}
