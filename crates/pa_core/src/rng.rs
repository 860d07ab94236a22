//! Pseudo-random control sequences.
//!
//! A gate that only rediscovers "take the next value" on primes should fall
//! to chance level on a sequence with no gap structure. Sequences come from
//! `ChaCha8Rng`, so a seed reproduces the same values on every platform.

use crate::error::{CoreError, Result};
use crate::predictor::{evaluate, AccuracyReport, EvalOptions, GapPredictor};
use crate::primes::{read_u64_lines, write_text};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

pub fn generate(seed: u64, count: usize, range: RangeInclusive<u64>) -> Result<Vec<u64>> {
    if range.is_empty() {
        return Err(CoreError::InvalidParameter(format!(
            "empty value range {}..={}",
            range.start(),
            range.end()
        )));
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Ok((0..count).map(|_| rng.gen_range(range.clone())).collect())
}

pub fn write_sequence(path: &Path, values: &[u64]) -> Result<()> {
    write_text(path, values)?;
    log::info!("Wrote {} values to {}", values.len(), path.display());
    Ok(())
}

/// Same format as a prime list, without the ordering requirement.
pub fn read_sequence(path: &Path, limit: Option<usize>) -> Result<Vec<u64>> {
    read_u64_lines(path, limit)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceVerdict {
    /// Accuracy above twice the chance level
    Structured,
    Random,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub accuracy: AccuracyReport,
    pub verdict: SequenceVerdict,
}

pub fn validate_sequence<P: GapPredictor + ?Sized>(
    seq: &[u64],
    predictor: &P,
    options: &EvalOptions,
) -> Result<ValidationReport> {
    let accuracy = evaluate(predictor, seq, options)?;
    let verdict = if accuracy.accuracy > 2.0 * accuracy.chance {
        SequenceVerdict::Structured
    } else {
        SequenceVerdict::Random
    };
    log::info!(
        "{}: {:.2}% vs chance {:.2}% -> {:?}",
        predictor.name(),
        accuracy.accuracy,
        accuracy.chance,
        verdict
    );
    Ok(ValidationReport { accuracy, verdict })
}
