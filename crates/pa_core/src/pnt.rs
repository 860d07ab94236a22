//! Prime counting against the prime number theorem approximations.

use crate::error::{CoreError, Result};
use crate::primes::PrimeTable;
use serde::{Deserialize, Serialize};

/// Final relative error below which the count is called converged.
pub const CONVERGENCE_ERROR: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PntSample {
    pub x: u64,
    /// π(x), exact
    pub pi: u64,
    /// x / ln x
    pub estimate: f64,
    /// x / ln x · (1 + 1 / ln x)
    pub refined: f64,
    /// Percent error of `estimate` relative to `pi`
    pub error: f64,
    pub refined_error: f64,
}

impl PntSample {
    fn at(x: u64, pi: u64) -> Self {
        let ln = (x as f64).ln();
        let estimate = x as f64 / ln;
        let refined = estimate * (1.0 + 1.0 / ln);
        let err = |v: f64| (pi as f64 - v).abs() / pi as f64 * 100.0;
        Self {
            x,
            pi,
            estimate,
            refined,
            error: err(estimate),
            refined_error: err(refined),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PntReport {
    pub samples: Vec<PntSample>,
    /// First, quarter, half and last samples
    pub checkpoints: Vec<PntSample>,
    pub final_error: f64,
    pub converged: bool,
}

/// Sample every `sample_every`-th prime `p_i`, where `π(p_i) = i + 1`.
pub fn pnt_comparison(table: &PrimeTable, sample_every: usize) -> Result<PntReport> {
    if sample_every == 0 {
        return Err(CoreError::InvalidParameter("sample_every must be >= 1".to_string()));
    }
    table.require(2)?;

    let primes = table.as_slice();
    let samples: Vec<PntSample> = primes
        .iter()
        .enumerate()
        .step_by(sample_every)
        .map(|(i, &p)| PntSample::at(p, i as u64 + 1))
        .collect();

    let n = samples.len();
    let mut picks = vec![0, n / 4, n / 2, n - 1];
    picks.dedup();
    let checkpoints = picks.into_iter().map(|i| samples[i]).collect();
    let final_error = samples[n - 1].error;

    Ok(PntReport {
        samples,
        checkpoints,
        final_error,
        converged: final_error < CONVERGENCE_ERROR,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pnt_converges_at_a_million_primes() -> Result<()> {
        let table = PrimeTable::sieve_count(1_000_000);
        let report = pnt_comparison(&table, 1000)?;
        assert_eq!(report.samples.len(), 1000);
        assert_eq!(report.checkpoints.len(), 4);
        // x / ln x undercounts by ~6.5% near 1.5e7
        assert!(!report.converged);
        let last = report.samples.last().unwrap();
        assert!(last.refined_error < 1.0, "{:?}", last);
        assert!(last.estimate < last.pi as f64);
        Ok(())
    }

    #[test]
    fn test_small_table() -> Result<()> {
        let table = PrimeTable::sieve(1000);
        let report = pnt_comparison(&table, 1)?;
        assert_eq!(report.samples.len(), 168);
        assert_eq!(report.samples[167].pi, 168);
        assert!(pnt_comparison(&table, 0).is_err());
        Ok(())
    }
}
