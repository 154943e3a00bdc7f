//! Tail reader for the append-only service log.

use crate::error::{Result, ZimanError};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

const CHUNK: u64 = 8192;

/// Return the last `n` lines of `path`, oldest first.
///
/// A missing log yields an empty list. Only the tail of the file is read.
pub fn tail_lines(path: &Path, n: usize) -> Result<Vec<String>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ZimanError::from_io("open log", path, e)),
    };
    let len = file
        .metadata()
        .map_err(|e| ZimanError::from_io("stat log", path, e))?
        .len();

    let mut offset = len;
    let mut buf: Vec<u8> = Vec::new();
    while offset > 0 {
        let read_size = std::cmp::min(CHUNK, offset);
        offset -= read_size;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| ZimanError::from_io("seek log", path, e))?;
        let mut tmp = vec![0u8; read_size as usize];
        file.read_exact(&mut tmp)
            .map_err(|e| ZimanError::from_io("read log", path, e))?;
        buf.splice(0..0, tmp);

        // n full lines need n newlines before them, plus the trailing one
        if buf.iter().filter(|b| **b == b'\n').count() > n {
            break;
        }
    }

    let text = String::from_utf8_lossy(&buf);
    let lines: Vec<&str> = text.lines().collect();
    // When the read stopped mid-file the first line may be partial.
    let start_partial = offset > 0;
    let usable = if start_partial && !lines.is_empty() {
        &lines[1..]
    } else {
        &lines[..]
    };
    let skip = usable.len().saturating_sub(n);
    Ok(usable[skip..].iter().map(|s| s.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let lines = tail_lines(&dir.path().join("zivpn.log"), 10).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_fewer_lines_than_requested() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zivpn.log");
        fs::write(&path, "one\ntwo\n").unwrap();
        assert_eq!(tail_lines(&path, 10).unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_last_n_without_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zivpn.log");
        fs::write(&path, "a\nb\nc\nd").unwrap();
        assert_eq!(tail_lines(&path, 2).unwrap(), vec!["c", "d"]);
    }

    #[test]
    fn test_spans_multiple_chunks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zivpn.log");
        let content: String = (0..5000).map(|i| format!("line {:05}\n", i)).collect();
        fs::write(&path, content).unwrap();
        let lines = tail_lines(&path, 3).unwrap();
        assert_eq!(lines, vec!["line 04997", "line 04998", "line 04999"]);

        let many = tail_lines(&path, 2000).unwrap();
        assert_eq!(many.len(), 2000);
        assert_eq!(many[0], "line 03000");
    }

    #[test]
    fn test_zero_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zivpn.log");
        fs::write(&path, "a\n").unwrap();
        assert!(tail_lines(&path, 0).unwrap().is_empty());
    }
}
