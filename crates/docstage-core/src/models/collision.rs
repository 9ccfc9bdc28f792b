use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::candidate::CandidateFile;

/// How a new file matched an already staged one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    /// Content digests are equal
    Exact,
    /// Name and size match but digests differ
    NameSize,
}

impl Display for MatchType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MatchType::Exact => write!(f, "exact"),
            MatchType::NameSize => write!(f, "name-size"),
        }
    }
}

/// A detected collision between a new file and a staged one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionRecord {
    pub new_file: CandidateFile,
    pub existing_file: CandidateFile,
    /// Position of `existing_file` in the working collection at detection time
    pub existing_index: usize,
    pub match_type: MatchType,
}

/// The user's decision for one collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionAction {
    Replace,
    Reject,
    KeepBoth,
}

impl FromStr for ResolutionAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(ResolutionAction::Replace),
            "reject" => Ok(ResolutionAction::Reject),
            "keep_both" | "keep-both" => Ok(ResolutionAction::KeepBoth),
            _ => Err(anyhow::anyhow!("Invalid resolution action: {}", s)),
        }
    }
}

impl Display for ResolutionAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ResolutionAction::Replace => write!(f, "replace"),
            ResolutionAction::Reject => write!(f, "reject"),
            ResolutionAction::KeepBoth => write!(f, "keep_both"),
        }
    }
}
