use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::FetchError;

/// Number of leading characters of an accession used as the archive's
/// directory shard.
pub const SHARD_PREFIX_LEN: usize = 6;

static RUN_ACCESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[SED]RR\d{6,}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Accession(String);

impl Accession {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First six characters, or the whole accession when it is shorter.
    pub fn shard_prefix(&self) -> &str {
        match self.0.char_indices().nth(SHARD_PREFIX_LEN) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }

    pub fn looks_like_run(&self) -> bool {
        RUN_ACCESSION.is_match(&self.0)
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Accession {
    type Err = FetchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FetchError::InvalidAccession(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadIndex {
    First,
    Second,
}

impl ReadIndex {
    pub const PAIR: [ReadIndex; 2] = [ReadIndex::First, ReadIndex::Second];

    pub fn number(self) -> u8 {
        match self {
            ReadIndex::First => 1,
            ReadIndex::Second => 2,
        }
    }
}

impl fmt::Display for ReadIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl Serialize for ReadIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

/// One mate file of a paired-end run as laid out on the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub read: ReadIndex,
    pub path: String,
}

impl RemoteFile {
    pub fn new(base: &str, accession: &Accession, read: ReadIndex) -> Self {
        Self {
            read,
            path: fastq_path(base, accession, read),
        }
    }

    /// Final path segment; used verbatim as the local file name.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn pair(base: &str, accession: &Accession) -> [RemoteFile; 2] {
        ReadIndex::PAIR.map(|read| RemoteFile::new(base, accession, read))
    }
}

pub fn fastq_path(base: &str, accession: &Accession, read: ReadIndex) -> String {
    let base = base.trim_end_matches('/');
    format!(
        "{base}/{}/{accession}/{accession}_{read}.fastq.gz",
        accession.shard_prefix()
    )
}

/// Parses accession list text: one accession per line, surrounding
/// whitespace stripped, blank lines skipped, file order kept.
pub fn parse_accession_list(content: &str) -> Vec<Accession> {
    content
        .lines()
        .filter_map(|line| line.parse::<Accession>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_accession_trims() {
        let acc: Accession = "  ERR000001\t".parse().unwrap();
        assert_eq!(acc.as_str(), "ERR000001");
    }

    #[test]
    fn parse_accession_blank() {
        let err = "   ".parse::<Accession>().unwrap_err();
        assert_matches!(err, FetchError::InvalidAccession(_));
    }

    #[test]
    fn shard_prefix_short_accession() {
        let acc: Accession = "ERR1".parse().unwrap();
        assert_eq!(acc.shard_prefix(), "ERR1");
        assert_eq!(
            fastq_path("/vol1/fastq", &acc, ReadIndex::Second),
            "/vol1/fastq/ERR1/ERR1/ERR1_2.fastq.gz"
        );
    }

    #[test]
    fn shard_prefix_counts_chars() {
        let acc: Accession = "ÄÖÜäöüß1".parse().unwrap();
        assert_eq!(acc.shard_prefix(), "ÄÖÜäöü");
    }

    #[test]
    fn base_trailing_slash_ignored() {
        let acc: Accession = "SRR014966".parse().unwrap();
        assert_eq!(
            fastq_path("/vol1/fastq/", &acc, ReadIndex::First),
            "/vol1/fastq/SRR014/SRR014966/SRR014966_1.fastq.gz"
        );
    }

    #[test]
    fn run_accession_shape() {
        let run: Accession = "DRR000001".parse().unwrap();
        assert!(run.looks_like_run());
        let sample: Accession = "SAMEA123".parse().unwrap();
        assert!(!sample.looks_like_run());
    }
}
