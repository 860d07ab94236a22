//! Plain-text integer lists (one value per line).

use super::PrimeTable;
use crate::error::{CoreError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Read up to `limit` integers. Blank lines are skipped; line numbers in
/// errors are 1-based.
pub fn read_u64_lines(path: &Path, limit: Option<usize>) -> Result<Vec<u64>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut values = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        if limit.is_some_and(|l| values.len() >= l) {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = trimmed.parse::<u64>().map_err(|_| CoreError::Parse {
            line: idx + 1,
            value: trimmed.to_string(),
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Load a prime list written by [`write_text`] or any external generator.
pub fn load_text(path: &Path, limit: Option<usize>) -> Result<PrimeTable> {
    let primes = read_u64_lines(path, limit)?;
    log::info!("Loaded {} primes from {}", primes.len(), path.display());
    PrimeTable::from_primes(primes)
}

/// Write one value per line.
pub fn write_text(path: &Path, values: &[u64]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for v in values {
        writeln!(writer, "{}", v)?;
    }
    writer.flush()?;
    log::debug!("Wrote {} values to {}", values.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_then_load() -> Result<()> {
        let table = PrimeTable::sieve(200);
        let file = NamedTempFile::new()?;
        write_text(file.path(), table.as_slice())?;

        let loaded = load_text(file.path(), None)?;
        assert_eq!(loaded.as_slice(), table.as_slice());

        let partial = load_text(file.path(), Some(10))?;
        assert_eq!(partial.len(), 10);
        assert_eq!(partial.largest(), Some(29));
        Ok(())
    }

    #[test]
    fn test_parse_error_reports_line() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "2\n3\n\n5\nseven")?;
        match read_u64_lines(file.path(), None) {
            Err(CoreError::Parse { line, value }) => {
                assert_eq!(line, 5);
                assert_eq!(value, "seven");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_unsorted_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "2\n5\n3")?;
        assert!(matches!(
            load_text(file.path(), None),
            Err(CoreError::UnsortedInput { .. })
        ));
        Ok(())
    }
}
