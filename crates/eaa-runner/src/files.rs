//! Line statistics for saved CLI output, e.g. a log export checked for
//! events delivered twice.

use eaa_core::HarnessError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

fn open(path: &Path) -> Result<BufReader<File>, HarnessError> {
    File::open(path).map(BufReader::new).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Number of lines in `path`; a last line without a newline still counts
///
/// # Errors
///
/// `HarnessError::Io` if the file cannot be read
pub fn line_count(path: &Path) -> Result<usize, HarnessError> {
    let mut reader = open(path)?;
    let mut buf = Vec::new();
    let mut count = 0;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| HarnessError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            return Ok(count);
        }
        count += 1;
    }
}

/// A stripped line that occurs more than once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub line: String,
    pub count: usize,
}

/// Lines of `path` seen more than once, keyed by their trimmed text
///
/// Most frequent first; ties keep first-seen order.
///
/// # Errors
///
/// `HarnessError::Io` if the file cannot be read or is not UTF-8
pub fn duplicates(path: &Path) -> Result<Vec<Duplicate>, HarnessError> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for line in open(path)?.lines() {
        let line = line.map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let key = line.trim();
        match counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                counts.insert(key.to_string(), 1);
                order.push(key.to_string());
            }
        }
    }

    let mut found: Vec<Duplicate> = order
        .into_iter()
        .filter_map(|line| {
            let count = counts.get(&line).copied().unwrap_or(0);
            (count > 1).then_some(Duplicate { line, count })
        })
        .collect();
    found.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(found)
}

/// Write `DUPLICATE[<count>] <line>` for every duplicate and return how many
/// distinct lines were duplicated
///
/// # Errors
///
/// `HarnessError::Io` if the file cannot be read or `out` rejects a write
pub fn duplicate_count<W: Write>(path: &Path, out: &mut W) -> Result<usize, HarnessError> {
    let found = duplicates(path)?;
    for duplicate in &found {
        writeln!(out, "DUPLICATE[{}] {}", duplicate.count, duplicate.line).map_err(|source| {
            HarnessError::Io {
                path: PathBuf::from("<output>"),
                source,
            }
        })?;
    }
    Ok(found.len())
}
