//! Loading the statement list from a newline-delimited file.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Ordered query texts, shared read-only by every worker.
pub type Statements = Arc<Vec<String>>;

/// Reads the whole file and returns one statement per line.
///
/// Line endings may be `\n` or `\r\n`. A trailing newline does not add an
/// empty statement, but blank lines inside the file are kept. Bytes that are
/// not valid UTF-8 are replaced rather than rejected.
pub fn load_statements(path: &Path) -> Result<Statements> {
    let read_error = |source| Error::ReadStatements {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let statements = split_statements(BufReader::new(file)).map_err(read_error)?;
    Ok(Arc::new(statements))
}

fn split_statements(reader: impl BufRead) -> io::Result<Vec<String>> {
    reader
        .split(b'\n')
        .map(|line| {
            let mut line = line?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            Ok(String::from_utf8_lossy(&line).into_owned())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn split(content: &[u8]) -> Vec<String> {
        split_statements(content).unwrap()
    }

    #[test]
    fn keeps_order_and_blank_lines() {
        let lines = split(b"SELECT 1\n\nSELECT 2\r\nSELECT 3\n");
        assert_eq!(lines, vec!["SELECT 1", "", "SELECT 2", "SELECT 3"]);
    }

    #[test]
    fn last_line_without_newline_is_kept() {
        assert_eq!(split(b"a\nb"), vec!["a", "b"]);
        assert!(split(b"").is_empty());
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let lines = split(b"SELECT 1\nSELECT '\xff'\n");
        assert_eq!(lines, vec!["SELECT 1", "SELECT '\u{fffd}'"]);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SELECT 1").unwrap();
        file.write_all(b"SELECT '\xff'\r\n").unwrap();

        let statements = load_statements(file.path()).unwrap();
        assert_eq!(statements.as_slice(), ["SELECT 1", "SELECT '\u{fffd}'"]);
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_statements(&dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, Error::ReadStatements { .. }));
        assert!(err.is_fatal());
    }
}
