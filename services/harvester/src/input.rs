//! Input id list reading
//!
//! The users file is a CSV (optionally gzip-compressed, detected by the
//! `.gz` suffix) with a `twitter_id` column. Ids are numeric but often
//! arrive float-mangled from spreadsheet tooling (`123.0`); every id is
//! normalized to its canonical integer string before collection so the
//! output files carry identical identifiers end to end.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use common::Error;
use flate2::read::GzDecoder;
use tracing::info;

/// Read and normalize the ordered user id list.
pub fn read_user_ids(path: &Path) -> common::Result<Vec<String>> {
    let file = File::open(path)
        .map_err(|e| Error::Config(format!("reading users file {}: {e}", path.display())))?;

    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let ids = parse_user_ids(BufReader::new(reader))?;
    info!(path = %path.display(), users = ids.len(), "loaded user id list");
    Ok(ids)
}

fn parse_user_ids<R: BufRead>(reader: R) -> common::Result<Vec<String>> {
    let mut lines = reader.lines().enumerate();

    let header = match lines.next() {
        Some((_, line)) => line?,
        None => return Err(Error::Config("users file is empty".into())),
    };
    let id_column = header
        .split(',')
        .map(str::trim)
        .position(|c| c == "twitter_id")
        .ok_or_else(|| Error::Config("users file missing column twitter_id".into()))?;

    let mut ids = Vec::new();
    for (line_no, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let field = line
            .split(',')
            .nth(id_column)
            .map(str::trim)
            .unwrap_or_default();
        ids.push(normalize_id(field, line_no + 1)?);
    }
    Ok(ids)
}

/// Normalize one id to its canonical integer string.
///
/// Accepts a plain integer or an integer with a spurious `.0` suffix.
/// Parsing goes through `u64` in both cases — never through a float —
/// so ids above 2^53 round-trip exactly.
fn normalize_id(field: &str, line_no: usize) -> common::Result<String> {
    let candidate = field.strip_suffix(".0").unwrap_or(field);
    let id: u64 = candidate.parse().map_err(|_| {
        Error::Config(format!(
            "users file line {line_no}: invalid twitter_id {field:?}"
        ))
    })?;
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::{Cursor, Write};

    fn parse(contents: &str) -> common::Result<Vec<String>> {
        parse_user_ids(Cursor::new(contents.as_bytes()))
    }

    #[test]
    fn parses_ids_in_order() {
        let ids = parse("twitter_id\n111\n222\n333\n").unwrap();
        assert_eq!(ids, vec!["111", "222", "333"]);
    }

    #[test]
    fn float_mangled_ids_normalize() {
        let ids = parse("twitter_id\n123.0\n456\n").unwrap();
        assert_eq!(ids, vec!["123", "456"]);
    }

    #[test]
    fn large_ids_round_trip_exactly() {
        // Above 2^53: would corrupt if parsed through f64.
        let ids = parse("twitter_id\n1354143047273353216.0\n").unwrap();
        assert_eq!(ids, vec!["1354143047273353216"]);
    }

    #[test]
    fn id_column_found_among_others() {
        let ids = parse("name,twitter_id,rank\nalice,42,1\nbob,7,2\n").unwrap();
        assert_eq!(ids, vec!["42", "7"]);
    }

    #[test]
    fn blank_lines_skipped() {
        let ids = parse("twitter_id\n1\n\n2\n").unwrap();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn missing_column_errors() {
        let err = parse("user_id\n1\n").unwrap_err();
        assert!(err.to_string().contains("twitter_id"), "got: {err}");
    }

    #[test]
    fn empty_file_errors() {
        assert!(parse("").is_err());
    }

    #[test]
    fn non_numeric_id_names_line() {
        let err = parse("twitter_id\n111\nabc\n").unwrap_err();
        assert!(err.to_string().contains("line 3"), "got: {err}");
    }

    #[test]
    fn fractional_id_rejected() {
        assert!(parse("twitter_id\n12.5\n").is_err());
    }

    #[test]
    fn reads_gzip_compressed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(b"twitter_id\n111\n222\n").unwrap();
        encoder.finish().unwrap();

        let ids = read_user_ids(&path).unwrap();
        assert_eq!(ids, vec!["111", "222"]);
    }

    #[test]
    fn reads_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(&path, "twitter_id\n5\n").unwrap();
        assert_eq!(read_user_ids(&path).unwrap(), vec!["5"]);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = read_user_ids(Path::new("/nonexistent/users.csv")).unwrap_err();
        assert!(err.to_string().contains("invalid configuration"), "got: {err}");
    }
}
