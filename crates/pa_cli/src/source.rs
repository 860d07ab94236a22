//! Prime source and scan configuration flags shared by the subcommands.

use anyhow::{Context, Result};
use clap::Args;
use pa_core::{PrimeTable, ScanConfig};
use std::path::PathBuf;

/// Number of primes sieved when no source flag is given.
pub const DEFAULT_PRIME_COUNT: usize = 1_000_000;

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Text file with one prime per line
    #[arg(long, conflicts_with_all = ["cache", "limit", "count"])]
    pub primes: Option<PathBuf>,

    /// Prime cache built with `cache build`
    #[arg(long, conflicts_with_all = ["limit", "count"])]
    pub cache: Option<PathBuf>,

    /// Sieve every prime up to N
    #[arg(long, conflicts_with = "count")]
    pub limit: Option<u64>,

    /// Sieve the first N primes [default: 1000000]
    #[arg(long)]
    pub count: Option<usize>,
}

impl SourceArgs {
    pub fn load(&self) -> Result<PrimeTable> {
        if let Some(path) = &self.primes {
            return pa_core::primes::load_text(path, None)
                .with_context(|| format!("Failed to load primes from {}", path.display()));
        }
        if let Some(path) = &self.cache {
            return pa_cache::load_cache(path)
                .with_context(|| format!("Failed to load prime cache {}", path.display()));
        }
        let table = match (self.limit, self.count) {
            (Some(limit), _) => PrimeTable::sieve(limit),
            (None, count) => PrimeTable::sieve_count(count.unwrap_or(DEFAULT_PRIME_COUNT)),
        };
        log::info!(
            "Sieved {} primes (largest {})",
            table.len(),
            table.largest().unwrap_or(0)
        );
        Ok(table)
    }
}

/// Output flag for analyses that take no scan config.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// JSON or YAML scan config (falls back to $PA_CONFIG_PATH)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// First prime index examined
    #[arg(long)]
    pub start_index: Option<usize>,

    /// Number of prime indices examined
    #[arg(long)]
    pub scan_count: Option<usize>,

    /// Disable rayon
    #[arg(long)]
    pub sequential: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    /// File (or environment) config with command-line overrides applied.
    pub fn resolve(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ScanConfig::from_env()?,
        };
        if let Some(start) = self.start_index {
            config.start_index = start;
        }
        if let Some(count) = self.scan_count {
            config.count = Some(count);
        }
        if self.sequential {
            config.parallel = false;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_limit_source() -> Result<()> {
        let source = SourceArgs {
            limit: Some(100),
            ..Default::default()
        };
        assert_eq!(source.load()?.len(), 25);
        Ok(())
    }

    #[test]
    fn test_count_source_is_exact() -> Result<()> {
        let source = SourceArgs {
            count: Some(10_000),
            ..Default::default()
        };
        let table = source.load()?;
        assert_eq!(table.len(), 10_000);
        assert_eq!(table.largest(), Some(104_729));
        Ok(())
    }

    #[test]
    fn test_overrides_win_over_file()-> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
        write!(file, r#"{{"modulus": 30, "start_index": 50}}"#)?;
        let args = ScanArgs {
            config: Some(file.path().to_path_buf()),
            start_index: Some(7),
            sequential: true,
            ..Default::default()
        };
        let config = args.resolve()?;
        assert_eq!(config.modulus, 30);
        assert_eq!(config.start_index, 7);
        assert!(!config.parallel);
        Ok(())
    }
}
