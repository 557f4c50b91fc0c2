//! Corpus building from a collected edge file
//!
//! Turns the raw edge list into training sentences: count how often each
//! followed id appears across all users, keep only ids seen more than the
//! popularity threshold, then emit one ordered sequence of surviving
//! followed-ids (as strings) per user. Users left with no popular follows
//! are dropped entirely.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use common::Error;
use tracing::info;

/// Build per-user sentences from an edge CSV (`userId,followedId` lines).
pub fn build_corpus(edge_file: &Path, popular_count: u64) -> common::Result<Vec<Vec<String>>> {
    let file = File::open(edge_file).map_err(|e| {
        Error::Config(format!("reading edge file {}: {e}", edge_file.display()))
    })?;

    let mut edges: Vec<(u64, u64)> = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        edges.push(parse_edge(&line, line_no + 1)?);
    }

    let mut counts: HashMap<u64, u64> = HashMap::new();
    for (_, followed) in &edges {
        *counts.entry(*followed).or_insert(0) += 1;
    }

    // Users ascending; follows keep edge-file order within each user.
    let mut grouped: BTreeMap<u64, Vec<String>> = BTreeMap::new();
    for (user, followed) in &edges {
        if counts[followed] > popular_count {
            grouped.entry(*user).or_default().push(followed.to_string());
        }
    }

    let sentences: Vec<Vec<String>> = grouped.into_values().collect();
    info!(
        edges = edges.len(),
        popular_count,
        sentences = sentences.len(),
        "corpus built"
    );
    Ok(sentences)
}

/// Write sentences as JSON to `training_data.json` in the output directory.
pub fn write_corpus(sentences: &[Vec<String>], output_dir: &Path) -> common::Result<PathBuf> {
    let path = output_dir.join("training_data.json");
    let file = File::create(&path)?;
    serde_json::to_writer(file, sentences)
        .map_err(|e| Error::Config(format!("serializing corpus: {e}")))?;
    info!(path = %path.display(), "corpus written");
    Ok(path)
}

fn parse_edge(line: &str, line_no: usize) -> common::Result<(u64, u64)> {
    let mut fields = line.split(',');
    let user = fields.next().map(str::trim);
    let followed = fields.next().map(str::trim);
    match (user, followed, fields.next()) {
        (Some(user), Some(followed), None) => {
            let user = user.parse().map_err(|_| bad_line(line, line_no))?;
            let followed = followed.parse().map_err(|_| bad_line(line, line_no))?;
            Ok((user, followed))
        }
        _ => Err(bad_line(line, line_no)),
    }
}

fn bad_line(line: &str, line_no: usize) -> Error {
    Error::Config(format!("edge file line {line_no}: malformed edge {line:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_file(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("edges.csv");
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Edge file where `followed` appears once per distinct user.
    fn repeated_edges(followed: u64, times: u64) -> String {
        let mut out = String::new();
        for user in 0..times {
            out.push_str(&format!("{user},{followed}\n"));
        }
        out
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        // 42 appears 301 times, 7 appears 299 times; threshold 300 keeps
        // only 42.
        let dir = tempfile::tempdir().unwrap();
        let mut contents = repeated_edges(42, 301);
        contents.push_str(&repeated_edges(7, 299));
        let path = edge_file(&dir, &contents);

        let sentences = build_corpus(&path, 300).unwrap();

        assert_eq!(sentences.len(), 301, "only the 42-followers survive");
        for sentence in &sentences {
            assert_eq!(sentence, &vec!["42".to_string()]);
        }
    }

    #[test]
    fn count_exactly_at_threshold_is_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let path = edge_file(&dir, &repeated_edges(9, 300));
        let sentences = build_corpus(&path, 300).unwrap();
        assert!(sentences.is_empty());
    }

    #[test]
    fn users_emit_in_ascending_order_with_follow_order_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = edge_file(
            &dir,
            "2,10\n2,20\n1,20\n1,10\n",
        );

        let sentences = build_corpus(&path, 0).unwrap();

        assert_eq!(
            sentences,
            vec![
                vec!["20".to_string(), "10".to_string()], // user 1
                vec!["10".to_string(), "20".to_string()], // user 2
            ]
        );
    }

    #[test]
    fn users_with_no_popular_follows_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        // 5 is followed twice (popular at threshold 1), 6 only once.
        let path = edge_file(&dir, "1,5\n2,5\n3,6\n");

        let sentences = build_corpus(&path, 1).unwrap();

        assert_eq!(
            sentences,
            vec![vec!["5".to_string()], vec!["5".to_string()]]
        );
    }

    #[test]
    fn empty_edge_file_builds_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = edge_file(&dir, "");
        assert!(build_corpus(&path, 300).unwrap().is_empty());
    }

    #[test]
    fn malformed_line_names_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = edge_file(&dir, "1,2\nnot-an-edge\n");
        let err = build_corpus(&path, 0).unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");
    }

    #[test]
    fn extra_field_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = edge_file(&dir, "1,2,3\n");
        assert!(build_corpus(&path, 0).is_err());
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = build_corpus(Path::new("/nonexistent/edges.csv"), 0).unwrap_err();
        assert!(err.to_string().contains("invalid configuration"), "got: {err}");
    }

    #[test]
    fn write_corpus_emits_json() {
        let dir = tempfile::tempdir().unwrap();
        let sentences = vec![vec!["42".to_string(), "7".to_string()]];

        let path = write_corpus(&sentences, dir.path()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Vec<String>> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, sentences);
    }
}
