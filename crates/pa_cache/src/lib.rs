//! Prime Table Cache
//!
//! Primes → first value + u32 gaps → MessagePack → LZ4 → SHA-256 checksum.
//! A 10^8 prime table shrinks from 800 MB of `u64` to well under 100 MB and
//! loads without re-sieving.

pub mod error;

pub use error::{CacheError, Result};

use pa_core::PrimeTable;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Schema written by this version.
pub const CACHE_SCHEMA: &str = "pa-primes-v1";

/// On-disk payload (before compression).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PrimeCache {
    schema: String,
    first: u64,
    gaps: Vec<u32>,
}

impl PrimeCache {
    fn encode(primes: &[u64]) -> Result<Self> {
        let first = primes.first().copied().unwrap_or(0);
        let gaps = primes
            .windows(2)
            .map(|w| {
                u32::try_from(w[1] - w[0])
                    .map_err(|_| CacheError::Corrupted(format!("gap after {} exceeds u32", w[0])))
            })
            .collect::<Result<Vec<u32>>>()?;
        Ok(Self {
            schema: CACHE_SCHEMA.to_string(),
            first,
            gaps,
        })
    }

    fn decode(self) -> Result<Vec<u64>> {
        if self.first == 0 {
            return Ok(Vec::new());
        }
        let mut primes = Vec::with_capacity(self.gaps.len() + 1);
        let mut current = self.first;
        primes.push(current);
        for gap in self.gaps {
            current = current
                .checked_add(u64::from(gap))
                .ok_or_else(|| CacheError::Corrupted("prime overflows u64".to_string()))?;
            primes.push(current);
        }
        Ok(primes)
    }
}

/// Cache metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub schema_version: String,
    /// SHA-256 of the file bytes (hex)
    pub checksum: String,
    /// RFC 3339
    pub created_at: String,
    pub prime_count: u64,
    pub largest_prime: u64,
    /// Size of the primes as raw `u64` (bytes)
    pub original_size: u64,
    pub compressed_size: u64,
    /// compressed / original
    pub compression_ratio: f64,
}

impl CacheMetadata {
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Write `table` to `output` and return its metadata.
pub fn build_cache(table: &PrimeTable, output: &Path) -> Result<CacheMetadata> {
    let primes = table.as_slice();
    let payload = PrimeCache::encode(primes)?;
    let msgpack = rmp_serde::to_vec(&payload)?;
    let compressed = lz4_flex::compress_prepend_size(&msgpack);
    let checksum = sha256_hex(&compressed);

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, &compressed)?;

    let original_size = primes.len() as u64 * 8;
    let compressed_size = compressed.len() as u64;
    log::info!(
        "Cached {} primes to {} ({} bytes)",
        primes.len(),
        output.display(),
        compressed_size
    );

    Ok(CacheMetadata {
        schema_version: CACHE_SCHEMA.to_string(),
        checksum,
        created_at: chrono::Utc::now().to_rfc3339(),
        prime_count: primes.len() as u64,
        largest_prime: table.largest().unwrap_or(0),
        original_size,
        compressed_size,
        compression_ratio: if original_size == 0 {
            0.0
        } else {
            compressed_size as f64 / original_size as f64
        },
    })
}

/// Read a text prime list and cache it.
pub fn build_from_text(input: &Path, output: &Path) -> Result<CacheMetadata> {
    let table = pa_core::primes::load_text(input, None)?;
    build_cache(&table, output)
}

/// Compare the file's SHA-256 with `expected_checksum`.
pub fn verify_cache(cache_file: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(cache_file)?;
    Ok(sha256_hex(&bytes).eq_ignore_ascii_case(expected_checksum.trim()))
}

fn decode_file(bytes: &[u8]) -> Result<PrimeCache> {
    let msgpack = lz4_flex::decompress_size_prepended(bytes)?;
    let payload: PrimeCache = rmp_serde::from_slice(&msgpack)?;
    if payload.schema != CACHE_SCHEMA {
        return Err(CacheError::SchemaMismatch {
            found: payload.schema,
            expected: CACHE_SCHEMA.to_string(),
        });
    }
    Ok(payload)
}

/// Decompress and decode a cache into a `PrimeTable`.
pub fn load_cache(cache_file: &Path) -> Result<PrimeTable> {
    let bytes = fs::read(cache_file)?;
    let primes = decode_file(&bytes)?.decode()?;
    log::info!("Loaded {} primes from {}", primes.len(), cache_file.display());
    Ok(PrimeTable::from_primes(primes)?)
}

/// Like [`load_cache`], but refuses a file whose checksum differs.
pub fn load_cache_verified(cache_file: &Path, expected_checksum: &str) -> Result<PrimeTable> {
    let bytes = fs::read(cache_file)?;
    let actual = sha256_hex(&bytes);
    if !actual.eq_ignore_ascii_case(expected_checksum.trim()) {
        return Err(CacheError::ChecksumMismatch {
            expected: expected_checksum.to_string(),
            actual,
        });
    }
    let primes = decode_file(&bytes)?.decode()?;
    Ok(PrimeTable::from_primes(primes)?)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheInfo {
    pub schema_version: String,
    pub checksum: String,
    pub file_size: u64,
    pub prime_count: u64,
    pub largest_prime: u64,
    pub max_gap: u32,
}

/// Summarise a cache file without building a `PrimeTable`.
pub fn inspect_cache(cache_file: &Path) -> Result<CacheInfo> {
    let bytes = fs::read(cache_file)?;
    let checksum = sha256_hex(&bytes);
    let payload = decode_file(&bytes)?;
    let max_gap = payload.gaps.iter().copied().max().unwrap_or(0);
    let prime_count = if payload.first == 0 {
        0
    } else {
        payload.gaps.len() as u64 + 1
    };
    let largest_prime = payload.first + payload.gaps.iter().map(|&g| u64::from(g)).sum::<u64>();
    Ok(CacheInfo {
        schema_version: payload.schema,
        checksum,
        file_size: bytes.len() as u64,
        prime_count,
        largest_prime,
        max_gap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_build_verify_load() -> Result<()> {
        let table = PrimeTable::sieve(1_000_000);
        let dir = tempdir()?;
        let path = dir.path().join("nested/primes.pac");

        let meta = build_cache(&table, &path)?;
        assert_eq!(meta.schema_version, CACHE_SCHEMA);
        assert_eq!(meta.prime_count, 78_498);
        assert_eq!(meta.largest_prime, 999_983);
        assert!(meta.compression_ratio < 0.5, "{}", meta.compression_ratio);
        assert!(verify_cache(&path, &meta.checksum)?);
        assert!(!verify_cache(&path, "00")?);

        let loaded = load_cache(&path)?;
        assert_eq!(loaded.as_slice(), table.as_slice());
        assert!(loaded.contains(999_983));

        let info = inspect_cache(&path)?;
        assert_eq!(info.prime_count, 78_498);
        assert_eq!(info.largest_prime, 999_983);
        assert_eq!(info.checksum, meta.checksum);
        // Largest gap below 10^6 follows 492113
        assert_eq!(info.max_gap, 114);
        Ok(())
    }

    #[test]
    fn test_checksum_mismatch_is_not_recoverable() -> Result<()> {
        let table = PrimeTable::sieve(1000);
        let file = NamedTempFile::new()?;
        build_cache(&table, file.path())?;
        let err = load_cache_verified(file.path(), "deadbeef").unwrap_err();
        assert!(matches!(err, CacheError::ChecksumMismatch { .. }));
        assert!(!err.is_recoverable());
        Ok(())
    }

    #[test]
    fn test_schema_mismatch_is_recoverable() -> Result<()> {
        let stale = PrimeCache {
            schema: "pa-primes-v0".to_string(),
            first: 2,
            gaps: vec![1, 2, 2],
        };
        let bytes = lz4_flex::compress_prepend_size(&rmp_serde::to_vec(&stale)?);
        let mut file = NamedTempFile::new()?;
        file.write_all(&bytes)?;

        let err = load_cache(file.path()).unwrap_err();
        assert!(matches!(err, CacheError::SchemaMismatch { .. }));
        assert!(err.is_recoverable());
        Ok(())
    }

    #[test]
    fn test_garbage_fails_to_decompress() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(&[10, 0, 0, 0, 0xff, 0xff, 0xff])?;
        assert!(load_cache(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_build_from_text_and_metadata_sidecar() -> Result<()> {
        let dir = tempdir()?;
        let text = dir.path().join("primes.txt");
        pa_core::primes::write_text(&text, PrimeTable::sieve(500).as_slice())?;

        let out = dir.path().join("primes.pac");
        let meta = build_from_text(&text, &out)?;
        assert_eq!(meta.prime_count, 95);

        let sidecar = dir.path().join("primes.meta.json");
        meta.save(&sidecar)?;
        assert_eq!(CacheMetadata::load(&sidecar)?, meta);
        Ok(())
    }

    #[test]
    fn test_empty_table_roundtrip() -> Result<()> {
        let empty = PrimeTable::from_primes(Vec::new())?;
        let file = NamedTempFile::new()?;
        let meta = build_cache(&empty, file.path())?;
        assert_eq!(meta.prime_count, 0);
        assert!(load_cache(file.path())?.is_empty());
        Ok(())
    }
}
