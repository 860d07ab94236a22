//! # pa_core - Prime Anchor Analysis Engine
//!
//! Statistics over anchors `S_n = p_n + p_{n+1}`: nearest-prime distances,
//! failure rates by residue class, the correction radius scan and the
//! next-prime predictors built on those rates.
//!
//! ## Features
//! - Bit-packed sieve with a Miller-Rabin fallback above the sieve bound
//! - Parallel whole-table scans (rayon) with deterministic reports
//! - JSON/YAML scan configuration, CSV and JSON exports
//! - Seeded pseudo-random control sequences (ChaCha8)

// Numeric reports cast freely between counts and percentages
#![allow(clippy::cast_precision_loss)]
// Long scan loops read better with explicit indices
#![allow(clippy::needless_range_loop)]
#![allow(clippy::too_many_arguments)]

pub mod anchor;
pub mod config;
pub mod correction;
pub mod error;
pub mod failure_rate;
pub mod gaps;
pub mod goldbach;
pub mod messiness;
pub mod pnt;
pub mod predictor;
pub mod primes;
pub mod rng;
pub mod scan;
pub mod sniper;
pub mod spectrum;
pub mod wheel;

pub use anchor::{k_min, law_one, LawOneStatus, NearestPrime, StructuralClass};
pub use config::{ScanConfig, CONFIG_PATH_ENV};
pub use correction::{CorrectionReport, Verdict};
pub use error::{CoreError, Result};
pub use messiness::MessinessMap;
pub use predictor::{
    evaluate, AccuracyReport, CandidateFilter, EvalOptions, GapPredictor, InternalFlip,
    NearestNeighbour, PhaseLock, PoolGenerator, PoolPrediction,
};
pub use primes::PrimeTable;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_small_scan() -> Result<()> {
        let table = PrimeTable::sieve(500_000);
        let config = ScanConfig::default();

        let rates = failure_rate::residue_failure_table(&table, &ScanConfig::mod6_control())?;
        let map = rates.to_messiness_map();
        assert!(map.score(0) < map.score(2));
        let gate = InternalFlip::new(MessinessMap::mod6_measured(), config.messy_threshold);
        let accuracy = evaluate(&gate, table.as_slice(), &EvalOptions::from_config(&config))?;
        assert_eq!(accuracy.accuracy, 100.0);

        let report = correction::scan(&table, &config)?;
        assert_eq!(report.modulus, 210);
        assert_eq!(report.failures, report.resolved + report.unresolved);
        Ok(())
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
