//! primeanchor CLI
//!
//! Prime source → analysis → table on stdout (or JSON with `--json`).
//! Logging goes to stderr; set `RUST_LOG=debug` for more.

mod render;
mod source;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pa_core::predictor::{next_prime, EvalOptions, GapPredictor, InternalFlip, NearestNeighbour, PhaseLock};
use pa_core::{
    correction, failure_rate, gaps, goldbach, pnt, rng, sniper, spectrum, wheel, CandidateFilter,
    MessinessMap, PoolGenerator, PrimeTable, ScanConfig,
};
use serde::Serialize;
use source::{OutputArgs, ScanArgs, SourceArgs};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "primeanchor", version)]
#[command(about = "Anchor statistics over sums of consecutive primes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sieve primes and write them as text
    Sieve {
        /// Sieve every prime up to N
        #[arg(long, conflicts_with = "count", required_unless_present = "count")]
        limit: Option<u64>,

        /// Sieve the first N primes
        #[arg(long)]
        count: Option<usize>,

        /// Output text file
        #[arg(long)]
        out: PathBuf,
    },

    /// Build, verify or inspect a compressed prime cache
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },

    /// Law I failure rate per anchor residue
    FailureRates {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        scan: ScanArgs,

        /// Anchor modulus
        #[arg(long)]
        modulus: Option<u64>,

        /// Write the residue table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the rates as a messiness map (JSON)
        #[arg(long)]
        map_out: Option<PathBuf>,
    },

    /// Clean vs messy failure rate at ascending prime checkpoints
    Drift {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        scan: ScanArgs,

        /// Prime values, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        checkpoints: Vec<u64>,
    },

    /// Correction radius scan for anchors divisible by the modulus
    Correction {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        scan: ScanArgs,

        /// Anchor modulus (210, or 6 for the control run)
        #[arg(long)]
        modulus: Option<u64>,

        /// Largest radius searched
        #[arg(long)]
        max_radius: Option<usize>,
    },

    /// Accuracy of a next-prime gate over the prime table
    Predict {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        scan: ScanArgs,

        #[arg(long, value_enum, default_value = "flip")]
        engine: Engine,

        /// Messiness map file (JSON)
        #[arg(long, conflicts_with = "preset")]
        map: Option<PathBuf>,

        /// Built-in messiness map: measured, asymptotic or generator
        #[arg(long)]
        preset: Option<String>,

        /// Candidates per prediction
        #[arg(long)]
        window: Option<usize>,

        /// Stop at the first wrong prediction
        #[arg(long)]
        stop_on_failure: bool,
    },

    /// Predict the prime after P from a filtered candidate pool
    NextPrime {
        /// A prime >= 5
        p: u64,

        #[arg(long, value_enum, default_value = "exact")]
        filter: FilterArg,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Twin, cousin and sexy gap census
    Gaps {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        scan: ScanArgs,

        /// Record densities every N gaps (0 = off)
        #[arg(long, default_value_t = 0)]
        checkpoint_every: usize,
    },

    /// Twin density × ln(p_N) against 2·C₂
    TwinConstant {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        output: OutputArgs,

        /// Gap counts N, comma separated
        #[arg(long, value_delimiter = ',', default_values_t = [100_000, 250_000, 500_000, 999_999])]
        checkpoints: Vec<usize>,
    },

    /// Goldbach partitions grouped by E mod 6
    Goldbach {
        /// Largest even number
        #[arg(long, default_value_t = 100_000)]
        limit: u64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Twin-prime search restricted to p ≡ 5 (mod 6)
    Sniper {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        output: OutputArgs,

        /// Twin pairs to find
        #[arg(long, default_value_t = 50_000)]
        target: usize,
    },

    /// Primality checks: odd stepping vs the mod-30 wheel
    Wheel {
        #[arg(long, default_value_t = 100_000)]
        samples: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Lowest start value
        #[arg(long, default_value_t = 10_000_000)]
        start_min: u64,

        /// Search window above each start
        #[arg(long, default_value_t = 210)]
        pool: u64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// π(x) against x / ln x
    Pnt {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        output: OutputArgs,

        #[arg(long, default_value_t = 1000)]
        sample_every: usize,
    },

    /// Gap spectrum by structural class (mod 210)
    Spectrum {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        scan: ScanArgs,

        /// Write (p, gap, class) rows as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// p_{k+1}² against ln(P_k#)
    Horizon {
        #[arg(long, default_value_t = 14)]
        k_max: usize,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Pseudo-random control sequences
    Rng {
        #[command(subcommand)]
        action: RngCommand,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Build a cache from a text list or a sieve
    Build {
        #[command(flatten)]
        source: SourceArgs,

        /// Output cache file
        #[arg(long)]
        out: PathBuf,

        /// Verify cache after building
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Check a cache against a checksum or metadata file
    Verify {
        file: PathBuf,

        #[arg(long, conflicts_with = "metadata", required_unless_present = "metadata")]
        checksum: Option<String>,

        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Show what a cache holds
    Info {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RngCommand {
    /// Write a seeded sequence, one value per line
    Generate {
        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = 1_000_000)]
        count: usize,

        #[arg(long, default_value_t = 1)]
        min: u64,

        #[arg(long, default_value_t = 1_000_000_000)]
        max: u64,

        #[arg(long)]
        out: PathBuf,
    },

    /// Run a gate over a sequence file and compare with chance
    Validate {
        #[arg(long)]
        input: PathBuf,

        #[arg(long, value_enum, default_value = "flip")]
        engine: Engine,

        #[arg(long)]
        window: Option<usize>,

        #[command(flatten)]
        scan: ScanArgs,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Engine {
    Flip,
    Phase,
    Nearest,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FilterArg {
    Exact,
    Primorial,
}

impl From<FilterArg> for CandidateFilter {
    fn from(f: FilterArg) -> Self {
        match f {
            FilterArg::Exact => CandidateFilter::Exact,
            FilterArg::Primorial => CandidateFilter::Primorial,
        }
    }
}

fn build_engine(engine: Engine, map: MessinessMap, config: &ScanConfig) -> Box<dyn GapPredictor> {
    match engine {
        Engine::Flip => Box::new(InternalFlip::new(map, config.messy_threshold)),
        Engine::Phase => Box::new(PhaseLock),
        Engine::Nearest => Box::new(NearestNeighbour),
    }
}

fn load_map(map: Option<&Path>, preset: Option<&str>) -> Result<MessinessMap> {
    if let Some(path) = map {
        return MessinessMap::load(path, Some(6))
            .with_context(|| format!("Failed to load messiness map {}", path.display()));
    }
    let name = preset.unwrap_or("measured");
    match MessinessMap::preset(name) {
        Some(map) => Ok(map),
        None => bail!("Unknown messiness preset '{}' (measured, asymptotic, generator)", name),
    }
}

/// Print `report` as JSON, or hand it to the table renderer.
fn emit<T: Serialize>(json: bool, report: &T, table: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        table(report);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sieve { limit, count, out } => {
            let table = match (limit, count) {
                (Some(limit), _) => PrimeTable::sieve(limit),
                (None, Some(count)) => PrimeTable::sieve_count(count),
                (None, None) => bail!("pass --limit or --count"),
            };
            pa_core::primes::write_text(&out, table.as_slice())
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!(
                "Wrote {} primes (largest {}) to {}",
                table.len(),
                table.largest().unwrap_or(0),
                out.display()
            );
        }

        Commands::Cache { action } => run_cache(action)?,

        Commands::FailureRates {
            source,
            scan,
            modulus,
            csv,
            map_out,
        } => {
            let mut config = scan.resolve()?;
            if let Some(m) = modulus {
                config.modulus = m;
            }
            config.validate()?;
            let table = source.load()?;
            let report = failure_rate::residue_failure_table(&table, &config)?;
            if let Some(path) = csv {
                report
                    .write_csv(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!("Residue table written to {}", path.display());
            }
            if let Some(path) = map_out {
                report
                    .to_messiness_map()
                    .save(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!("Messiness map written to {}", path.display());
            }
            emit(scan.json, &report, render::residue_table)?;
        }

        Commands::Drift {
            source,
            scan,
            checkpoints,
        } => {
            let config = scan.resolve()?;
            let table = source.load()?;
            let report = failure_rate::drift(&table, &checkpoints, config.max_distance)?;
            emit(scan.json, &report, render::drift)?;
        }

        Commands::Correction {
            source,
            scan,
            modulus,
            max_radius,
        } => {
            let mut config = scan.resolve()?;
            if let Some(m) = modulus {
                config.modulus = m;
            }
            if let Some(r) = max_radius {
                config.max_radius = r;
            }
            let table = source.load()?;
            let report = correction::scan(&table, &config)?;
            emit(scan.json, &report, render::correction)?;
        }

        Commands::Predict {
            source,
            scan,
            engine,
            map,
            preset,
            window,
            stop_on_failure,
        } => {
            let mut config = scan.resolve()?;
            if let Some(w) = window {
                config.window = w;
            }
            config.validate()?;
            let map = load_map(map.as_deref(), preset.as_deref())?;
            let gate = build_engine(engine, map, &config);
            let table = source.load()?;
            let options = EvalOptions {
                stop_on_first_failure: stop_on_failure,
                ..EvalOptions::from_config(&config)
            };
            let report = pa_core::evaluate(gate.as_ref(), table.as_slice(), &options)?;
            emit(scan.json, &report, render::accuracy)?;
        }

        Commands::NextPrime { p, filter, scan } => {
            let config = scan.resolve()?;
            let generator = PoolGenerator::from_config(&config, filter.into());
            let prediction = generator.predict(p)?;
            let truth = next_prime(p);
            emit(scan.json, &prediction, |pred| render::pool_prediction(pred, truth))?;
        }

        Commands::Gaps {
            source,
            scan,
            checkpoint_every,
        } => {
            let config = scan.resolve()?;
            let table = source.load()?;
            let report = gaps::gap_census(&table, config.count, checkpoint_every)?;
            emit(scan.json, &report, render::gap_census)?;
        }

        Commands::TwinConstant {
            source,
            output,
            checkpoints,
        } => {
            let table = source.load()?;
            let report = gaps::twin_constant(&table, &checkpoints)?;
            emit(output.json, &report, render::twin_constant)?;
        }

        Commands::Goldbach { limit, output } => {
            let table = PrimeTable::sieve(limit);
            let report = goldbach::goldbach_by_residue(&table, limit)?;
            emit(output.json, &report, render::goldbach)?;
        }

        Commands::Sniper {
            source,
            output,
            target,
        } => {
            let table = source.load()?;
            let report = sniper::twin_sniper(&table, target)?;
            emit(output.json, &report, render::sniper)?;
        }

        Commands::Wheel {
            samples,
            seed,
            start_min,
            pool,
            output,
        } => {
            let starts = wheel::sample_starts(samples, seed, start_min);
            let report = wheel::wheel_benchmark(&starts, pool)?;
            emit(output.json, &report, render::wheel)?;
        }

        Commands::Pnt {
            source,
            output,
            sample_every,
        } => {
            let table = source.load()?;
            let report = pnt::pnt_comparison(&table, sample_every)?;
            emit(output.json, &report, render::pnt)?;
        }

        Commands::Spectrum { source, scan, csv } => {
            let config = scan.resolve()?;
            let table = source.load()?;
            let report = spectrum::spectrum(&table, config.count)?;
            if let Some(path) = csv {
                spectrum::write_spectrum_csv(&table, config.count, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            emit(scan.json, &report, render::spectrum)?;
        }

        Commands::Horizon { k_max, output } => {
            let rows = spectrum::vacuum_horizon(k_max)?;
            emit(output.json, &rows, |rows| render::horizon(rows))?;
        }

        Commands::Rng { action } => run_rng(action)?,
    }

    Ok(())
}

fn run_cache(action: CacheCommand) -> Result<()> {
    match action {
        CacheCommand::Build {
            source,
            out,
            verify,
            metadata,
        } => {
            let table = source.load()?;
            println!("Building prime cache...");
            println!("   Output: {}", out.display());
            let meta = pa_cache::build_cache(&table, &out)
                .with_context(|| format!("Failed to build cache {}", out.display()))?;
            render::cache_metadata(&meta);

            if verify {
                verify_cache_integrity(&out, &meta.checksum)?;
            }
            if let Some(path) = metadata {
                meta.save(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("\nMetadata saved to: {}", path.display());
            }
        }

        CacheCommand::Verify {
            file,
            checksum,
            metadata,
        } => {
            let expected = match (checksum, metadata) {
                (Some(sum), _) => sum,
                (None, Some(path)) => {
                    pa_cache::CacheMetadata::load(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?
                        .checksum
                }
                (None, None) => bail!("pass --checksum or --metadata"),
            };
            verify_cache_integrity(&file, &expected)?;
        }

        CacheCommand::Info { file, json } => {
            let info = pa_cache::inspect_cache(&file)
                .with_context(|| format!("Failed to read cache {}", file.display()))?;
            emit(json, &info, render::cache_info)?;
        }
    }
    Ok(())
}

fn verify_cache_integrity(cache_path: &Path, checksum: &str) -> Result<()> {
    println!("\nVerifying cache integrity...");
    let is_valid = pa_cache::verify_cache(cache_path, checksum)
        .with_context(|| format!("Failed to read cache {}", cache_path.display()))?;

    if is_valid {
        println!("Cache verification passed");
        Ok(())
    } else {
        bail!("Cache verification failed - checksum mismatch!")
    }
}

fn run_rng(action: RngCommand) -> Result<()> {
    match action {
        RngCommand::Generate {
            seed,
            count,
            min,
            max,
            out,
        } => {
            let values = rng::generate(seed, count, min..=max)?;
            rng::write_sequence(&out, &values)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Wrote {} values (seed {}) to {}", values.len(), seed, out.display());
        }

        RngCommand::Validate {
            input,
            engine,
            window,
            scan,
        } => {
            let mut config = scan.resolve()?;
            if let Some(w) = window {
                config.window = w;
            }
            config.validate()?;
            let seq = rng::read_sequence(&input, None)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let gate = build_engine(engine, MessinessMap::mod6_measured(), &config);
            let options = EvalOptions {
                start: scan.start_index.unwrap_or(0),
                ..EvalOptions::from_config(&config)
            };
            let report = rng::validate_sequence(&seq, gate.as_ref(), &options)?;
            emit(scan.json, &report, render::validation)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_correction_flags() {
        let cli = Cli::try_parse_from([
            "primeanchor",
            "correction",
            "--limit",
            "1000000",
            "--modulus",
            "6",
            "--max-radius",
            "12",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Correction {
                source,
                scan,
                modulus,
                max_radius,
            } => {
                assert_eq!(source.limit, Some(1_000_000));
                assert_eq!(modulus, Some(6));
                assert_eq!(max_radius, Some(12));
                assert!(scan.json);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_source_flags_conflict() {
        assert!(Cli::try_parse_from([
            "primeanchor",
            "gaps",
            "--primes",
            "p.txt",
            "--limit",
            "100"
        ])
        .is_err());
    }

    #[test]
    fn test_drift_checkpoint_list() {
        let cli = Cli::try_parse_from([
            "primeanchor",
            "drift",
            "--checkpoints",
            "1000,20000,300000",
        ])
        .unwrap();
        match cli.command {
            Commands::Drift { checkpoints, .. } => {
                assert_eq!(checkpoints, vec![1000, 20000, 300000])
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_non_scan_commands_take_only_json() {
        let cli = Cli::try_parse_from(["primeanchor", "goldbach", "--limit", "1000", "--json"]).unwrap();
        match cli.command {
            Commands::Goldbach { limit, output } => {
                assert_eq!(limit, 1000);
                assert!(output.json);
            }
            _ => panic!("wrong subcommand"),
        }
        for args in [
            ["primeanchor", "goldbach", "--sequential"],
            ["primeanchor", "pnt", "--scan-count"],
            ["primeanchor", "horizon", "--config"],
            ["primeanchor", "twin-constant", "--start-index"],
        ] {
            assert!(Cli::try_parse_from(args).is_err(), "{:?}", args);
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert!(load_map(None, Some("nope")).is_err());
        assert!(load_map(None, None).is_ok());
    }
}
