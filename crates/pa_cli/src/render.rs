//! Plain-text report tables for stdout.

use pa_cache::{CacheInfo, CacheMetadata};
use pa_core::correction::{CorrectionReport, Verdict, REFERENCE_RADIUS};
use pa_core::failure_rate::{DriftReport, ResidueTable};
use pa_core::gaps::{GapCensus, TwinConstantReport, TWIN_CONSTANT_2C2};
use pa_core::goldbach::GoldbachReport;
use pa_core::pnt::PntReport;
use pa_core::predictor::{AccuracyReport, PoolPrediction};
use pa_core::rng::ValidationReport;
use pa_core::sniper::SniperReport;
use pa_core::spectrum::{HorizonRow, SpectrumReport};
use pa_core::wheel::WheelReport;

fn rule(width: usize) {
    println!("{}", "-".repeat(width));
}

fn heading(title: &str) {
    println!("{}", "=".repeat(72));
    println!(" {}", title);
    println!("{}", "=".repeat(72));
}

pub fn residue_table(report: &ResidueTable) {
    heading(&format!(
        "Law I failure rate by anchor residue (mod {})",
        report.modulus
    ));
    println!(
        "{:>8} | {:>12} | {:>10} | {:>9} | {:>10}",
        "residue", "anchors", "failures", "unbounded", "rate %"
    );
    rule(60);
    for row in &report.rows {
        let rate = row
            .failure_rate
            .map(|r| format!("{:.4}", r))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>8} | {:>12} | {:>10} | {:>9} | {:>10}",
            row.residue, row.anchors, row.failures, row.unbounded, rate
        );
    }
    rule(60);
    println!("Total anchors: {}", report.total_anchors);
}

pub fn drift(report: &DriftReport) {
    heading("Failure rate drift (clean = 0 mod 6, messy = 2, 4 mod 6)");
    println!(
        "{:>14} | {:>10} | {:>10} | {:>6}",
        "prime", "clean %", "messy %", "trend"
    );
    rule(50);
    for c in &report.checkpoints {
        println!(
            "{:>14} | {:>10.4} | {:>10.4} | {:>6?}",
            c.prime, c.clean_rate, c.messy_rate, c.direction
        );
    }
    rule(50);
    println!("Noise ratio (messy / clean): {:.2}x", report.noise_ratio);
}

pub fn correction(report: &CorrectionReport) {
    heading(&format!(
        "Correction radius scan: anchors = 0 mod {}, radius <= {}",
        report.modulus, report.max_radius
    ));
    println!("Indices scanned:   {}", report.indices_scanned);
    println!("Anchors tested:    {}", report.anchors_tested);
    println!(
        "Law I failures:    {} ({:.4}%)",
        report.failures, report.failure_rate
    );
    println!("Resolved:          {}", report.resolved);
    println!("Unresolved:        {}", report.unresolved);
    println!("Unbounded:         {}", report.unbounded);
    println!("Resolution rate:   {:.4}%", report.resolution_rate);
    println!("r_max:             {}", report.r_max);

    if !report.radius_histogram.is_empty() {
        println!("\n{:>6} | {:>10}", "radius", "resolved");
        rule(20);
        for (r, n) in &report.radius_histogram {
            println!("{:>6} | {:>10}", r, n);
        }
    }

    let offset = &report.nearest_offset;
    println!(
        "\nNearest prime within 1: {} ({:.4}%), largest k_min {}",
        offset.within_one, offset.within_one_rate, offset.max_k_min
    );

    for ex in &report.unresolved_examples {
        println!(
            "  unresolved: n={} S={} q={} k={}",
            ex.index, ex.anchor, ex.nearest_prime, ex.distance
        );
    }

    let verdict = match report.verdict {
        Verdict::RadiusBelow(r) => format!("all failures resolved, r_max = {} < {}", r, REFERENCE_RADIUS),
        Verdict::RadiusConfirmed(r) => format!("all failures resolved, r_max = {}", r),
        Verdict::RadiusAbove(r) => {
            format!("all failures resolved, but r_max = {} exceeds {}", r, REFERENCE_RADIUS)
        }
        Verdict::Incomplete => format!(
            "{} failures unresolved within radius {}",
            report.unresolved, report.max_radius
        ),
    };
    println!("\nVerdict: {}", verdict);
}

pub fn accuracy(report: &AccuracyReport) {
    heading(&format!(
        "Gate accuracy: {} (window {})",
        report.engine, report.window
    ));
    println!("Predictions: {}", report.predictions);
    println!("Hits:        {}", report.hits);
    if report.skipped > 0 {
        println!("Skipped:     {}", report.skipped);
    }
    println!("Accuracy:    {:.4}%", report.accuracy);
    println!("Chance:      {:.2}%", report.chance);
    for m in &report.misses {
        println!(
            "  miss at n={}: p={} expected {} got {:?}",
            m.index, m.value, m.expected, m.predicted
        );
    }
}

pub fn validation(report: &ValidationReport) {
    accuracy(&report.accuracy);
    println!("Verdict:     {:?}", report.verdict);
}

pub fn pool_prediction(pred: &PoolPrediction, truth: Option<u64>) {
    heading(&format!("Pool prediction after {} ({:?} filter)", pred.input, pred.filter));
    for step in &pred.trace {
        println!("  {}", step);
    }
    match (pred.next, truth) {
        (Some(next), Some(t)) => {
            let mark = if next == t { "correct" } else { "wrong" };
            println!("\nPredicted: {}  actual: {}  ({})", next, t, mark);
        }
        (Some(next), None) => println!("\nPredicted: {}", next),
        (None, _) => println!("\nNo prediction"),
    }
}

pub fn gap_census(report: &GapCensus) {
    heading("Gap census");
    let c = &report.counts;
    println!("{:<24} | {:>12}", "gaps", c.gaps);
    println!("{:<24} | {:>12} | {:.4}", "twin (2)", c.twin, report.twin_density);
    println!("{:<24} | {:>12} | {:.4}", "cousin (4)", c.cousin, report.cousin_density);
    println!("{:<24} | {:>12}", "sexy (6)", c.sexy);
    println!("{:<24} | {:>12}", "triplet 2 -> 4", c.triplet_2_4);
    println!("{:<24} | {:>12}", "triplet 4 -> 2", c.triplet_4_2);
    rule(56);
    println!("Sexy density (all pairs 6 apart): {:.4} per 1000", report.sexy_density);
    println!("Sexy / twin ratio:                {:.5}x", report.sexy_twin_ratio);

    if !report.checkpoints.is_empty() {
        println!("\n{:>14} | {:>10} | {:>10} | {:>8}", "gaps", "twin", "cousin", "ratio");
        rule(52);
        for cp in &report.checkpoints {
            println!(
                "{:>14} | {:>10.4} | {:>10.4} | {:>8.4}",
                cp.gaps, cp.twin_density, cp.cousin_density, cp.sexy_twin_ratio
            );
        }
    }
}

pub fn twin_constant(report: &TwinConstantReport) {
    heading(&format!("Twin constant estimate (2*C2 = {})", TWIN_CONSTANT_2C2));
    println!(
        "{:>12} | {:>14} | {:>10} | {:>10} | {:>9}",
        "N", "p_N", "density", "estimate", "delta"
    );
    rule(66);
    for e in &report.estimates {
        println!(
            "{:>12} | {:>14} | {:>10.6} | {:>10.6} | {:>+9.5}",
            e.n, e.prime, e.density, e.estimate, e.deviation
        );
    }
    rule(66);
    println!(
        "Mean {:.6}, spread {:.6}, stable: {}",
        report.mean, report.spread, report.stable
    );
}

pub fn goldbach(report: &GoldbachReport) {
    heading(&format!("Goldbach partitions up to {}", report.limit));
    println!(
        "{:>8} | {:>8} | {:>12} | {:>10} | {:>6}",
        "E mod 6", "evens", "partitions", "average", "scale"
    );
    rule(56);
    for c in &report.classes {
        println!(
            "{:>8} | {:>8} | {:>12} | {:>10.2} | {:>6.3}",
            c.residue, c.evens, c.partitions, c.average, c.scale
        );
    }
    rule(56);
    println!("Clean / messy ratio: {:.4}", report.clean_messy_ratio);
}

pub fn sniper(report: &SniperReport) {
    heading(&format!("Twin sniper: first {} twin pairs", report.target));
    println!("Pairs found:       {}", report.found);
    println!("Blind checks:      {}", report.blind_checks);
    println!("Filtered checks:   {}", report.filtered_checks);
    println!("Skipped:           {}", report.skipped_checks);
    println!("Workload cut:      {:.2}%", report.reduction);
    println!("Pair lists match:  {}", report.pairs_match);
    if let Some((p, q)) = report.last_pair {
        println!("Last pair:         ({}, {})", p, q);
    }
}

pub fn wheel(report: &WheelReport) {
    heading(&format!(
        "Next-prime search over {} starts (pool {})",
        report.samples, report.pool
    ));
    println!("Odd stepping checks: {}", report.blind_checks);
    println!("Mod-30 wheel checks: {}", report.wheel_checks);
    println!(
        "Reduction:           {:.4}x (theory {:.4}x)",
        report.reduction_factor, report.theoretical
    );
    println!("Mismatches:          {}", report.mismatches);
    if report.not_found > 0 {
        println!("No prime in pool:    {}", report.not_found);
    }
}

pub fn pnt(report: &PntReport) {
    heading("Prime count vs x / ln x");
    println!(
        "{:>14} | {:>10} | {:>12} | {:>8} | {:>8}",
        "x", "pi(x)", "x/ln x", "err %", "refined %"
    );
    rule(64);
    for s in &report.checkpoints {
        println!(
            "{:>14} | {:>10} | {:>12.0} | {:>8.4} | {:>8.4}",
            s.x, s.pi, s.estimate, s.error, s.refined_error
        );
    }
    rule(64);
    println!(
        "Final error {:.4}% -> converged (< 5%): {}",
        report.final_error, report.converged
    );
}

pub fn spectrum(report: &SpectrumReport) {
    heading("Gap spectrum by anchor class (mod 210)");
    for c in &report.classes {
        let shown: Vec<String> = c.gaps.iter().take(12).map(|g| g.to_string()).collect();
        let more = if c.gaps.len() > 12 { ", ..." } else { "" };
        println!(
            "{:<12} {:>10} pairs ({:>6.2}%)  gaps [{}{}]",
            c.class.label(),
            c.pairs,
            c.share,
            shown.join(", "),
            more
        );
    }
    println!("\nGap 6 inside the vacuum class: {}", report.gap6_in_vacuum);
}

pub fn horizon(rows: &[HorizonRow]) {
    heading("Vacuum horizon p_{k+1}^2 vs ln(P_k#)");
    println!("{:>4} | {:>8} | {:>14} | {:>12}", "k", "p_{k+1}", "p_{k+1}^2", "ln(P_k#)");
    rule(48);
    for r in rows {
        println!(
            "{:>4} | {:>8} | {:>14} | {:>12.4}",
            r.k, r.p_next, r.horizon, r.log_primorial
        );
    }
}

pub fn cache_metadata(meta: &CacheMetadata) {
    println!("\nCache built successfully!");
    println!("   Primes:          {} (largest {})", meta.prime_count, meta.largest_prime);
    println!(
        "   Raw size:        {} bytes ({:.2} MB)",
        meta.original_size,
        meta.original_size as f64 / (1024.0 * 1024.0)
    );
    println!(
        "   Compressed size: {} bytes ({:.2} MB)",
        meta.compressed_size,
        meta.compressed_size as f64 / (1024.0 * 1024.0)
    );
    println!("   Compression:     {:.1}%", meta.compression_ratio * 100.0);
    println!("   Checksum:        {}", meta.checksum);
    println!("   Created:         {}", meta.created_at);
}

pub fn cache_info(info: &CacheInfo) {
    println!("Schema:        {}", info.schema_version);
    println!("Primes:        {}", info.prime_count);
    println!("Largest prime: {}", info.largest_prime);
    println!("Largest gap:   {}", info.max_gap);
    println!("File size:     {} bytes", info.file_size);
    println!("Checksum:      {}", info.checksum);
}
