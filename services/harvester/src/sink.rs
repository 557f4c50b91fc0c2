//! Durable output sinks
//!
//! Two append-only, line-oriented destinations per run: the edge file
//! (successful follows, one `userId,followedId` line per edge) and the
//! failure file (one `userId` line for empty, deleted, private, or
//! erroring users). File names carry the run timestamp, so a restart
//! opens fresh files instead of resuming in place; any de-duplication
//! happens downstream.
//!
//! Writes are flushed per user, so a crash loses at most the user whose
//! task was in flight.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File locations for one collection run.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub edges: PathBuf,
    pub failures: PathBuf,
    pub log: PathBuf,
}

impl RunPaths {
    /// Paths stamped with the current local time.
    pub fn new(output_dir: &Path) -> Self {
        Self::with_stamp(output_dir, &chrono::Local::now().format("%Y%m%d_%H%M%S").to_string())
    }

    /// Paths with an explicit stamp (tests).
    pub fn with_stamp(output_dir: &Path, stamp: &str) -> Self {
        Self {
            edges: output_dir.join(format!("friends_collected_{stamp}.csv")),
            failures: output_dir.join(format!("deleted_or_private_users_{stamp}.csv")),
            log: output_dir.join(format!("collection_{stamp}.log")),
        }
    }
}

/// Append-only edge and failure sinks for one run.
pub struct OutputSink {
    edges: BufWriter<File>,
    failures: BufWriter<File>,
}

impl OutputSink {
    /// Create both sink files.
    pub fn create(paths: &RunPaths) -> common::Result<Self> {
        Ok(Self {
            edges: BufWriter::new(append_file(&paths.edges)?),
            failures: BufWriter::new(append_file(&paths.failures)?),
        })
    }

    /// Record every edge of a successful fetch, in the given (ascending)
    /// order, then flush.
    pub fn write_edges(&mut self, user_id: &str, follows: &[u64]) -> common::Result<()> {
        for followed in follows {
            writeln!(self.edges, "{user_id},{followed}")?;
        }
        self.edges.flush()?;
        Ok(())
    }

    /// Record a failed or empty user, then flush.
    pub fn write_failure(&mut self, user_id: &str) -> common::Result<()> {
        writeln!(self.failures, "{user_id}")?;
        self.failures.flush()?;
        Ok(())
    }
}

fn append_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
