//! Credential loading for the rotation pool
//!
//! The tokens file is a plain CSV with a header row naming the four OAuth
//! 1.0a fields. Row order defines rotation order and a credential's
//! identity is its position in the pool. The pool is loaded once and never
//! mutated for the lifetime of the process.

use std::path::Path;

use common::{Error, Secret};
use source::SourceError;
use tracing::info;

/// Header columns the tokens CSV must provide, in any order.
const REQUIRED_COLUMNS: [&str; 4] = [
    "consumer_key",
    "consumer_secret",
    "access_token",
    "access_token_secret",
];

/// One complete set of keys authorizing API access as a distinct
/// rate-limit-accounted identity. Secrets are redacted in Debug output.
#[derive(Debug, Clone)]
pub struct Credential {
    pub consumer_key: String,
    pub consumer_secret: Secret<String>,
    pub access_token: String,
    pub access_token_secret: Secret<String>,
}

/// Ordered, immutable credential list.
#[derive(Debug)]
pub struct CredentialPool {
    credentials: Vec<Credential>,
}

impl CredentialPool {
    /// Load credentials from a CSV file.
    ///
    /// Fails with a configuration error if the file is missing a required
    /// column, has a malformed row, or contains no credential rows at all.
    /// All of this is detected before any network activity.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("reading tokens file {}: {e}", path.display()))
        })?;
        let pool = Self::parse(&contents)?;
        info!(
            path = %path.display(),
            credentials = pool.size(),
            "loaded credential pool"
        );
        Ok(pool)
    }

    /// Parse CSV contents into a pool. Split out for testability.
    fn parse(contents: &str) -> common::Result<Self> {
        let mut lines = contents.lines().enumerate();

        let (_, header) = lines
            .next()
            .ok_or_else(|| Error::Config("tokens file is empty".into()))?;
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();

        let mut positions = [0usize; 4];
        for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
            positions[slot] = columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| Error::Config(format!("tokens file missing column {name}")))?;
        }

        let mut credentials = Vec::new();
        for (line_no, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != columns.len() {
                return Err(Error::Config(format!(
                    "tokens file line {}: expected {} fields, got {}",
                    line_no + 1,
                    columns.len(),
                    fields.len()
                )));
            }
            credentials.push(Credential {
                consumer_key: fields[positions[0]].to_owned(),
                consumer_secret: Secret::new(fields[positions[1]].to_owned()),
                access_token: fields[positions[2]].to_owned(),
                access_token_secret: Secret::new(fields[positions[3]].to_owned()),
            });
        }

        if credentials.is_empty() {
            return Err(Error::Config("tokens file has no credential rows".into()));
        }

        Ok(Self { credentials })
    }

    /// Credential at pool index `index`.
    ///
    /// The rotation coordinator keeps its index in range, so an
    /// out-of-range access here is a logic error upstream, surfaced
    /// rather than panicking.
    pub fn get(&self, index: usize) -> source::Result<&Credential> {
        self.credentials
            .get(index)
            .ok_or(SourceError::IndexOutOfRange {
                index,
                size: self.credentials.len(),
            })
    }

    /// Number of credentials in the pool (fixed for the process lifetime).
    pub fn size(&self) -> usize {
        self.credentials.len()
    }
}
