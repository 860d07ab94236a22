//! Gap spectrum by structural class, and the vacuum horizon table.

use crate::anchor::StructuralClass;
use crate::error::{CoreError, Result};
use crate::primes::PrimeTable;
use crate::scan::percent;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Primes up to 5 divide the primorial and are left out of the spectrum.
const FIRST_INDEX: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpectrum {
    pub class: StructuralClass,
    pub pairs: u64,
    pub share: f64,
    /// Distinct gaps observed, ascending
    pub gaps: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumReport {
    pub pairs: u64,
    pub classes: Vec<ClassSpectrum>,
    pub gap6_in_vacuum: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectrumRow {
    pub prime: u64,
    pub gap: u64,
    pub class: String,
}

fn pairs(table: &PrimeTable, count: Option<usize>) -> Result<impl Iterator<Item = (u64, u64)> + '_> {
    let available = table.len().saturating_sub(FIRST_INDEX + 1);
    let n = count.unwrap_or(available);
    if n == 0 || n > available {
        return Err(CoreError::InsufficientPrimes {
            needed: FIRST_INDEX + n + 1,
            available: table.len(),
        });
    }
    Ok(table.as_slice()[FIRST_INDEX..]
        .windows(2)
        .take(n)
        .map(|w| (w[0], w[1] - w[0])))
}

/// Classify consecutive pairs from 7 upwards by the class of their anchor.
pub fn spectrum(table: &PrimeTable, count: Option<usize>) -> Result<SpectrumReport> {
    let mut by_class: BTreeMap<StructuralClass, (u64, BTreeSet<u64>)> = StructuralClass::ALL
        .iter()
        .map(|&c| (c, (0, BTreeSet::new())))
        .collect();

    let mut total = 0u64;
    for (p, gap) in pairs(table, count)? {
        let entry = by_class.entry(StructuralClass::of(2 * p + gap)).or_default();
        entry.0 += 1;
        entry.1.insert(gap);
        total += 1;
    }

    let gap6_in_vacuum = by_class
        .get(&StructuralClass::Vacuum)
        .is_some_and(|(_, gaps)| gaps.contains(&6));
    let classes = by_class
        .into_iter()
        .map(|(class, (n, gaps))| ClassSpectrum {
            class,
            pairs: n,
            share: percent(n, total),
            gaps: gaps.into_iter().collect(),
        })
        .collect();

    Ok(SpectrumReport {
        pairs: total,
        classes,
        gap6_in_vacuum,
    })
}

/// One `(p, gap, class)` row per consecutive pair.
pub fn write_spectrum_csv(table: &PrimeTable, count: Option<usize>, path: &Path) -> Result<u64> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0u64;
    for (prime, gap) in pairs(table, count)? {
        writer.serialize(SpectrumRow {
            prime,
            gap,
            class: StructuralClass::of(2 * prime + gap).label().to_string(),
        })?;
        rows += 1;
    }
    writer.flush()?;
    log::info!("Wrote {} spectrum rows to {}", rows, path.display());
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonRow {
    pub k: usize,
    pub p_k: u64,
    pub p_next: u64,
    /// p_{k+1}²
    pub horizon: u64,
    /// ln(P_k#), summed as logs
    pub log_primorial: f64,
}

/// `p_{k+1}²` against `ln(P_k#)` for `k = 1 ..= k_max`.
pub fn vacuum_horizon(k_max: usize) -> Result<Vec<HorizonRow>> {
    if k_max == 0 || k_max > 100_000 {
        return Err(CoreError::InvalidParameter(format!(
            "k_max must be in 1..=100000, got {}",
            k_max
        )));
    }
    let table = PrimeTable::sieve_count(k_max + 1);
    let primes = table.as_slice();

    let mut log_primorial = 0.0;
    let mut rows = Vec::with_capacity(k_max);
    for k in 1..=k_max {
        let p_k = primes[k - 1];
        let p_next = primes[k];
        log_primorial += (p_k as f64).ln();
        rows.push(HorizonRow {
            k,
            p_k,
            p_next,
            horizon: p_next * p_next,
            log_primorial,
        });
    }
    Ok(rows)
}
