//! Law I failure rates by anchor residue
//!
//! For every anchor `S_n` in a range the nearest prime distance is measured
//! and the anchor is binned by `S_n mod m`. The per-residue failure rate is
//! what the predictors use as "messiness".
//!
//! `drift` tracks how the clean (0 mod 6) and messy (2, 4 mod 6) rates
//! evolve as the scan moves up the number line.

use crate::anchor::{anchor_at, law_one, LawOneStatus};
use crate::config::ScanConfig;
use crate::error::{CoreError, Result};
use crate::messiness::MessinessMap;
use crate::primes::PrimeTable;
use crate::scan::{fold_range, percent, resolve_range, Progress, ScanStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidueCounts {
    pub anchors: u64,
    pub failures: u64,
    pub unbounded: u64,
}

impl ResidueCounts {
    pub fn failure_rate(&self) -> f64 {
        percent(self.failures, self.anchors)
    }

    fn add(&mut self, other: &ResidueCounts) {
        self.anchors += other.anchors;
        self.failures += other.failures;
        self.unbounded += other.unbounded;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidueRow {
    pub residue: u64,
    pub anchors: u64,
    pub failures: u64,
    pub unbounded: u64,
    /// `None` when no anchor falls in this residue
    pub failure_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidueTable {
    pub modulus: u64,
    pub total_anchors: u64,
    pub rows: Vec<ResidueRow>,
}

#[derive(Default)]
struct ResidueStats {
    by_residue: BTreeMap<u64, ResidueCounts>,
}

impl ScanStats for ResidueStats {
    fn merge(&mut self, later: Self) {
        for (r, counts) in later.by_residue {
            self.by_residue.entry(r).or_default().add(&counts);
        }
    }
}

/// Measure failure rates over the configured index range.
pub fn residue_failure_table(table: &PrimeTable, config: &ScanConfig) -> Result<ResidueTable> {
    config.validate()?;
    let modulus = config.modulus;
    let range = resolve_range(table.len(), config.start_index, config.count, 0, 2)?;
    log::info!(
        "Failure rates mod {} over prime indices {}..{}",
        modulus,
        range.start,
        range.end
    );

    let progress = Progress::new("failure-rates", range.len(), config.progress_interval);
    let stats = fold_range(range, config.parallel, &progress, |s: &mut ResidueStats, i| {
        let Some(anchor) = anchor_at(table, i) else {
            return;
        };
        let entry = s.by_residue.entry(anchor % modulus).or_default();
        entry.anchors += 1;
        match law_one(table, anchor, config.max_distance) {
            LawOneStatus::Failure(_) => entry.failures += 1,
            LawOneStatus::Unbounded => entry.unbounded += 1,
            LawOneStatus::Clean(_) => {}
        }
    });

    let total_anchors = stats.by_residue.values().map(|c| c.anchors).sum();
    // Residues no anchor reaches stay in the table with no rate
    let rows = (0..modulus)
        .map(|r| {
            let counts = stats.by_residue.get(&r).copied().unwrap_or_default();
            ResidueRow {
                residue: r,
                anchors: counts.anchors,
                failures: counts.failures,
                unbounded: counts.unbounded,
                failure_rate: (counts.anchors > 0).then(|| counts.failure_rate()),
            }
        })
        .collect();

    Ok(ResidueTable {
        modulus,
        total_anchors,
        rows,
    })
}

impl ResidueTable {
    pub fn row(&self, residue: u64) -> Option<&ResidueRow> {
        self.rows.iter().find(|r| r.residue == residue)
    }

    /// Residues that never occurred are left out and score the map default.
    pub fn to_messiness_map(&self) -> MessinessMap {
        let scores = self
            .rows
            .iter()
            .filter_map(|r| r.failure_rate.map(|rate| (r.residue, rate)))
            .collect();
        MessinessMap::new(self.modulus, scores)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftDirection {
    Start,
    Rise,
    Fall,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftCheckpoint {
    /// First prime at or above the requested checkpoint value
    pub prime: u64,
    pub clean_rate: f64,
    pub messy_rate: f64,
    pub direction: DriftDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub checkpoints: Vec<DriftCheckpoint>,
    pub final_clean_rate: f64,
    pub final_messy_rate: f64,
    /// messy / clean, 0 when the clean rate is 0
    pub noise_ratio: f64,
}

const DRIFT_TOLERANCE: f64 = 0.001;

/// Cumulative clean vs messy failure rate at ascending prime-value
/// checkpoints. Runs sequentially: each checkpoint depends on its prefix.
pub fn drift(table: &PrimeTable, checkpoints: &[u64], max_distance: u64) -> Result<DriftReport> {
    if checkpoints.is_empty() {
        return Err(CoreError::InvalidParameter(
            "drift needs at least one checkpoint".to_string(),
        ));
    }
    let mut pending: Vec<u64> = checkpoints.to_vec();
    pending.sort_unstable();
    pending.dedup();

    // The last prime with a successor is the last one the scan can reach
    let last_needed = *pending.last().unwrap_or(&0);
    let reachable = table.len().checked_sub(2).and_then(|i| table.get(i));
    if reachable.map_or(true, |p| p < last_needed) {
        return Err(CoreError::InsufficientPrimes {
            needed: table.count_up_to(last_needed) + 2,
            available: table.len(),
        });
    }

    let mut clean = ResidueCounts::default();
    let mut messy = ResidueCounts::default();
    let mut out: Vec<DriftCheckpoint> = Vec::with_capacity(pending.len());
    let mut next = 0usize;

    for i in 0..table.len().saturating_sub(1) {
        if next >= pending.len() {
            break;
        }
        let Some(anchor) = anchor_at(table, i) else {
            break;
        };
        let p = table.as_slice()[i];

        let bucket = match anchor % 6 {
            0 => Some(&mut clean),
            2 | 4 => Some(&mut messy),
            _ => None,
        };
        if let Some(bucket) = bucket {
            match law_one(table, anchor, max_distance) {
                LawOneStatus::Failure(_) => {
                    bucket.anchors += 1;
                    bucket.failures += 1;
                }
                LawOneStatus::Clean(_) => bucket.anchors += 1,
                LawOneStatus::Unbounded => bucket.unbounded += 1,
            }
        }

        while next < pending.len() && p >= pending[next] {
            let clean_rate = clean.failure_rate();
            let messy_rate = messy.failure_rate();
            let direction = match out.last() {
                None => DriftDirection::Start,
                Some(prev) if clean_rate - prev.clean_rate > DRIFT_TOLERANCE => {
                    DriftDirection::Rise
                }
                Some(prev) if clean_rate - prev.clean_rate < -DRIFT_TOLERANCE => {
                    DriftDirection::Fall
                }
                Some(_) => DriftDirection::Flat,
            };
            log::info!(
                "drift checkpoint p={} clean={:.4}% messy={:.4}%",
                p,
                clean_rate,
                messy_rate
            );
            out.push(DriftCheckpoint {
                prime: p,
                clean_rate,
                messy_rate,
                direction,
            });
            next += 1;
        }
    }

    let final_clean_rate = out.last().map(|c| c.clean_rate).unwrap_or(0.0);
    let final_messy_rate = out.last().map(|c| c.messy_rate).unwrap_or(0.0);
    let noise_ratio = if final_clean_rate > 0.0 {
        final_messy_rate / final_clean_rate
    } else {
        0.0
    };

    Ok(DriftReport {
        checkpoints: out,
        final_clean_rate,
        final_messy_rate,
        noise_ratio,
    })
}
