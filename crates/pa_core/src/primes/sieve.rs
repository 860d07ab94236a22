//! Sieve of Eratosthenes over a bit-packed table.

use super::PrimeBits;

/// Sieve every integer in `0..=limit`.
pub(crate) fn sieve_bits(limit: u64) -> PrimeBits {
    let mut bits = PrimeBits::all_set(limit);
    bits.clear(0);
    if limit >= 1 {
        bits.clear(1);
    }

    let mut i = 2u64;
    while i * i <= limit {
        if bits.get(i) {
            let mut j = i * i;
            while j <= limit {
                bits.clear(j);
                j += i;
            }
        }
        i += 1;
    }
    bits
}

/// Upper bound for the n-th prime (Rosser-Schoenfeld, valid for n >= 6).
pub fn nth_prime_upper_bound(n: usize) -> u64 {
    if n < 6 {
        return 15;
    }
    let n = n as f64;
    let ln = n.ln();
    (n * (ln + ln.ln())).ceil() as u64
}
