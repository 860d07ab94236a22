//! Next-prime predictors ("logic gates")
//!
//! A [`GapPredictor`] picks the successor of `p` out of a short candidate
//! list. Over a list of consecutive primes the true successor is the first
//! candidate, so [`evaluate`] measures whether a gate reproduces the
//! nearest-neighbour choice; over arbitrary integers (see `rng`) it measures
//! whether the gate finds structure that is not there.
//!
//! [`PoolGenerator`] works without a prime list: it filters the integers in
//! `p + 2 ..= p + pool_width` and applies the same gate to the survivors.

use crate::config::ScanConfig;
use crate::error::{CoreError, Result};
use crate::messiness::MessinessMap;
use crate::primes::{is_prime_u64, primorial_filter};
use crate::scan::{fold_range, percent, resolve_range, Progress, ScanStats};
use serde::{Deserialize, Serialize};

pub trait GapPredictor: Sync {
    fn name(&self) -> &str;

    fn predict(&self, p: u64, candidates: &[u64]) -> Option<u64>;

    /// Inputs the gate is not defined for are skipped by [`evaluate`].
    fn applies_to(&self, _p: u64) -> bool {
        true
    }
}

#[inline]
fn signed_gap(p: u64, q: u64) -> i128 {
    q as i128 - p as i128
}

/// Weighted-gap winner with the messy-bin flip.
///
/// Each candidate scores `(messiness(p + q) + 1) * (q - p)`; the lowest
/// score wins. If a messy candidate (messiness above the threshold) has a
/// smaller gap than the winner, the prediction flips to it.
#[derive(Debug, Clone)]
pub struct InternalFlip {
    pub map: MessinessMap,
    pub messy_threshold: f64,
}

impl InternalFlip {
    pub fn new(map: MessinessMap, messy_threshold: f64) -> Self {
        Self {
            map,
            messy_threshold,
        }
    }
}

impl Default for InternalFlip {
    fn default() -> Self {
        Self::new(MessinessMap::mod6_measured(), 20.0)
    }
}

impl GapPredictor for InternalFlip {
    fn name(&self) -> &str {
        "internal-flip"
    }

    fn predict(&self, p: u64, candidates: &[u64]) -> Option<u64> {
        let mut winner: Option<(f64, u64, i128)> = None;
        let mut messy_low: Option<(i128, u64)> = None;

        for &q in candidates {
            let gap = signed_gap(p, q);
            let messiness = self.map.score_pair(p, q);
            let score = (messiness + 1.0) * gap as f64;

            // Strict comparisons: the first candidate wins ties
            if winner.map_or(true, |(best, _, _)| score < best) {
                winner = Some((score, q, gap));
            }
            if messiness > self.messy_threshold && messy_low.map_or(true, |(g, _)| gap < g) {
                messy_low = Some((gap, q));
            }
        }

        let (_, winner_q, winner_gap) = winner?;
        match messy_low {
            Some((gap, q)) if gap < winner_gap => Some(q),
            _ => Some(winner_q),
        }
    }
}

/// Modulo-phase lock: a gap divisible by 6 may only land on an anchor that
/// is not 0 mod 6, and any other gap only on one that is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseLock;

impl GapPredictor for PhaseLock {
    fn name(&self) -> &str {
        "phase-lock"
    }

    fn predict(&self, p: u64, candidates: &[u64]) -> Option<u64> {
        let mut ordered: Vec<u64> = candidates.to_vec();
        ordered.sort_by_key(|&q| signed_gap(p, q));

        ordered.into_iter().find(|&q| {
            let gap = signed_gap(p, q);
            let residue = (p as u128 + q as u128) % 6;
            if gap.rem_euclid(6) == 0 {
                residue != 0
            } else {
                residue == 0
            }
        })
    }

    fn applies_to(&self, p: u64) -> bool {
        p > 3
    }
}

/// Smallest candidate above `p`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbour;

impl GapPredictor for NearestNeighbour {
    fn name(&self) -> &str {
        "nearest"
    }

    fn predict(&self, p: u64, candidates: &[u64]) -> Option<u64> {
        candidates.iter().copied().filter(|&q| q > p).min()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Miss {
    pub index: usize,
    pub value: u64,
    pub expected: u64,
    pub predicted: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub engine: String,
    pub window: usize,
    pub predictions: u64,
    pub hits: u64,
    pub skipped: u64,
    pub accuracy: f64,
    /// One candidate in `window` picked at random
    pub chance: f64,
    pub misses: Vec<Miss>,
}

#[derive(Debug, Clone, Copy)]
pub struct EvalOptions {
    pub start: usize,
    pub count: Option<usize>,
    pub window: usize,
    pub stop_on_first_failure: bool,
    pub parallel: bool,
    pub progress_interval: usize,
}

impl EvalOptions {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            start: config.start_index,
            count: config.count,
            window: config.window,
            stop_on_first_failure: false,
            parallel: config.parallel,
            progress_interval: config.progress_interval,
        }
    }
}

const MAX_MISSES: usize = 10;

#[derive(Default)]
struct EvalStats {
    predictions: u64,
    hits: u64,
    skipped: u64,
    misses: Vec<Miss>,
}

impl ScanStats for EvalStats {
    fn merge(&mut self, later: Self) {
        self.predictions += later.predictions;
        self.hits += later.hits;
        self.skipped += later.skipped;
        let room = MAX_MISSES.saturating_sub(self.misses.len());
        self.misses.extend(later.misses.into_iter().take(room));
    }
}

impl EvalStats {
    fn visit<P: GapPredictor + ?Sized>(&mut self, predictor: &P, seq: &[u64], i: usize, window: usize) -> bool {
        let value = seq[i];
        if !predictor.applies_to(value) {
            self.skipped += 1;
            return true;
        }
        let expected = seq[i + 1];
        let predicted = predictor.predict(value, &seq[i + 1..=i + window]);
        self.predictions += 1;
        if predicted == Some(expected) {
            self.hits += 1;
            true
        } else {
            if self.misses.len() < MAX_MISSES {
                self.misses.push(Miss {
                    index: i,
                    value,
                    expected,
                    predicted,
                });
            }
            false
        }
    }
}

/// Score a predictor against a sequence: at index `i` the candidates are
/// `seq[i+1 ..= i+window]` and the truth is `seq[i+1]`.
pub fn evaluate<P: GapPredictor + ?Sized>(
    predictor: &P,
    seq: &[u64],
    options: &EvalOptions,
) -> Result<AccuracyReport> {
    if options.window == 0 {
        return Err(CoreError::InvalidParameter("window must be >= 1".to_string()));
    }
    let range = resolve_range(seq.len(), options.start, options.count, 0, options.window)?;
    log::info!(
        "Evaluating {} over indices {}..{} (window {})",
        predictor.name(),
        range.start,
        range.end,
        options.window
    );

    let stats = if options.stop_on_first_failure {
        let mut stats = EvalStats::default();
        for i in range {
            if !stats.visit(predictor, seq, i, options.window) {
                log::info!("Stopping at first failure, index {}", i);
                break;
            }
        }
        stats
    } else {
        let progress = Progress::new(predictor.name(), range.len(), options.progress_interval);
        fold_range(range, options.parallel, &progress, |s: &mut EvalStats, i| {
            s.visit(predictor, seq, i, options.window);
        })
    };

    Ok(AccuracyReport {
        engine: predictor.name().to_string(),
        window: options.window,
        predictions: stats.predictions,
        hits: stats.hits,
        skipped: stats.skipped,
        accuracy: percent(stats.hits, stats.predictions),
        chance: 100.0 / options.window as f64,
        misses: stats.misses,
    })
}

// ---------------------------------------------------------------------------
// Pool generator
// ---------------------------------------------------------------------------

/// How pool candidates are admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateFilter {
    /// Miller-Rabin: only primes enter the pool
    Exact,
    /// Divisibility by 2..=13 only; composites with larger factors slip in
    Primorial,
}

impl CandidateFilter {
    fn admits(&self, n: u64) -> bool {
        match self {
            CandidateFilter::Exact => is_prime_u64(n),
            CandidateFilter::Primorial => !primorial_filter(n),
        }
    }
}

/// Messiness of the gap residue, used by the clean-pool tie-breaker.
const GAP_RESIDUE_MESSINESS: [f64; 6] = [1.0, 0.0, 1.0, 2.0, 2.0, 0.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolCandidate {
    pub prime: u64,
    pub gap: u64,
    pub messiness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolPrediction {
    pub input: u64,
    pub filter: CandidateFilter,
    pub candidates_examined: usize,
    pub structural_min: Option<PoolCandidate>,
    pub baseline: Option<PoolCandidate>,
    pub flipped: bool,
    pub next: Option<u64>,
    pub trace: Vec<String>,
}

impl PoolPrediction {
    pub fn gap(&self) -> Option<u64> {
        self.next.map(|n| n - self.input)
    }

    /// Compare against the true next prime.
    pub fn verify(&self) -> bool {
        self.verified_with(is_prime_u64)
    }

    /// True when `next` passes `test` and no integer between the input and
    /// `next` does.
    pub fn verified_with(&self, mut test: impl FnMut(u64) -> bool) -> bool {
        match self.next {
            Some(n) if n > self.input => test(n) && !(self.input + 1..n).any(&mut test),
            _ => false,
        }
    }
}

/// Smallest prime above `n`, or `None` on overflow.
pub fn next_prime(n: u64) -> Option<u64> {
    let mut c = n.checked_add(1)?;
    while !is_prime_u64(c) {
        c = c.checked_add(1)?;
    }
    Some(c)
}

#[derive(Debug, Clone)]
pub struct PoolGenerator {
    pub map: MessinessMap,
    pub clean_threshold: f64,
    pub messy_threshold: f64,
    pub depth_threshold: usize,
    pub pool_width: u64,
    pub filter: CandidateFilter,
}

impl PoolGenerator {
    pub fn from_config(config: &ScanConfig, filter: CandidateFilter) -> Self {
        Self {
            map: MessinessMap::mod6_generator(),
            clean_threshold: config.clean_threshold,
            messy_threshold: config.messy_threshold,
            depth_threshold: config.depth_threshold,
            pool_width: config.pool_width,
            filter,
        }
    }

    pub fn predict(&self, p: u64) -> Result<PoolPrediction> {
        if p < 5 || !is_prime_u64(p) {
            return Err(CoreError::InvalidParameter(format!(
                "pool generator needs a prime >= 5, got {}",
                p
            )));
        }

        let mut trace = Vec::new();
        let candidates: Vec<PoolCandidate> = (2..=self.pool_width)
            .filter_map(|g| {
                let q = p.checked_add(g)?;
                self.filter.admits(q).then(|| PoolCandidate {
                    prime: q,
                    gap: g,
                    messiness: self.map.score_pair(p, q),
                })
            })
            .collect();
        trace.push(format!(
            "{} candidates in gap range 2..={} ({:?} filter)",
            candidates.len(),
            self.pool_width,
            self.filter
        ));

        let structural_min = candidates
            .iter()
            .find(|c| c.messiness >= self.messy_threshold)
            .copied();
        if let Some(m) = structural_min {
            trace.push(format!(
                "structural minimum g={} (messiness {:.2})",
                m.gap, m.messiness
            ));
        }

        let clean_pool: Vec<&PoolCandidate> = candidates
            .iter()
            .filter(|c| c.messiness < self.clean_threshold)
            .collect();

        let baseline = if clean_pool.len() <= 1 {
            candidates.iter().fold(None::<PoolCandidate>, |best, c| match best {
                Some(b) if b.messiness <= c.messiness => Some(b),
                _ => Some(*c),
            })
        } else {
            clean_pool
                .iter()
                .take(self.depth_threshold)
                .fold(None::<(f64, PoolCandidate)>, |best, c| {
                    let gm = GAP_RESIDUE_MESSINESS[(c.gap % 6) as usize];
                    match best {
                        Some((b, _)) if b <= gm => best,
                        _ => Some((gm, **c)),
                    }
                })
                .map(|(_, c)| c)
        };
        if let Some(b) = baseline {
            trace.push(format!("baseline winner g={} ({})", b.gap, b.prime));
        }

        let (next, flipped) = match (structural_min, baseline) {
            (Some(m), Some(b)) if m.gap < b.gap => (Some(m.prime), true),
            (_, Some(b)) => (Some(b.prime), false),
            (Some(m), None) => (Some(m.prime), true),
            (None, None) => (None, false),
        };
        trace.push(match next {
            Some(n) if flipped => format!("flip to structural minimum: {} (gap {})", n, n - p),
            Some(n) => format!("baseline holds: {} (gap {})", n, n - p),
            None => "no candidate in pool".to_string(),
        });

        Ok(PoolPrediction {
            input: p,
            filter: self.filter,
            candidates_examined: candidates.len(),
            structural_min,
            baseline,
            flipped,
            next,
            trace,
        })
    }
}
