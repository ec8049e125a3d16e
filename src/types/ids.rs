//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different identifiers (e.g., using
//! a raw commit SHA where a PR number is expected) and make signatures
//! self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A pull request number within a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrNumber(pub u64);

impl fmt::Display for PrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for PrNumber {
    fn from(n: u64) -> Self {
        PrNumber(n)
    }
}

/// Error returned when a string is not a valid commit SHA.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid commit SHA {0:?}: expected 40 hex characters")]
pub struct InvalidSha(pub String);

/// A git commit SHA (40 lowercase hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha(String);

impl Sha {
    /// Parses and validates a SHA.
    ///
    /// Accepts exactly 40 ASCII hex digits; uppercase input is normalized to
    /// lowercase so that SHAs from different API surfaces compare equal.
    pub fn parse(s: impl AsRef<str>) -> Result<Self, InvalidSha> {
        let s = s.as_ref();
        if s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Sha(s.to_ascii_lowercase()))
        } else {
            Err(InvalidSha(s.to_string()))
        }
    }

    /// Returns the SHA as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short (7-character) version for display.
    pub fn short(&self) -> &str {
        &self.0[..7]
    }

    /// Returns true if this is the all-zero SHA GitHub uses to signal a
    /// deleted ref in push payloads.
    pub fn is_zero(&self) -> bool {
        self.0.bytes().all(|b| b == b'0')
    }
}

impl fmt::Display for Sha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a valid `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid repository {0:?}: expected owner/repo")]
pub struct InvalidRepoId(pub String);

/// A repository identifier (owner/repo).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl FromStr for RepoId {
    type Err = InvalidRepoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(RepoId::new(owner, repo))
            }
            _ => Err(InvalidRepoId(s.to_string())),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod pr_number {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_roundtrip(n: u64) {
                let pr = PrNumber(n);
                let json = serde_json::to_string(&pr).unwrap();
                let parsed: PrNumber = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(pr, parsed);
            }

            #[test]
            fn ordering_matches_underlying(a: u64, b: u64) {
                prop_assert_eq!(PrNumber(a) < PrNumber(b), a < b);
            }
        }

        #[test]
        fn display_uses_hash_prefix() {
            assert_eq!(format!("{}", PrNumber(42)), "#42");
        }
    }

    mod sha {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parse_accepts_hex(s in "[0-9a-f]{40}") {
                let sha = Sha::parse(&s).unwrap();
                prop_assert_eq!(sha.as_str(), s.as_str());
            }

            #[test]
            fn parse_normalizes_case(s in "[0-9A-F]{40}") {
                let sha = Sha::parse(&s).unwrap();
                prop_assert_eq!(sha, Sha::parse(s.to_ascii_lowercase()).unwrap());
            }

            #[test]
            fn short_is_prefix(s in "[0-9a-f]{40}") {
                let sha = Sha::parse(&s).unwrap();
                prop_assert_eq!(sha.short(), &s[..7]);
            }
        }

        #[test]
        fn parse_rejects_wrong_length() {
            assert!(Sha::parse("abc123").is_err());
            assert!(Sha::parse("").is_err());
        }

        #[test]
        fn parse_rejects_non_hex() {
            assert!(Sha::parse("zzzz567890123456789012345678901234567890").is_err());
        }

        #[test]
        fn zero_sha_detected() {
            let zero = Sha::parse("0".repeat(40)).unwrap();
            assert!(zero.is_zero());

            let nonzero = Sha::parse("a".repeat(40)).unwrap();
            assert!(!nonzero.is_zero());
        }
    }

    mod repo_id {
        use super::*;

        #[test]
        fn from_str_valid() {
            let id: RepoId = "octocat/hello-world".parse().unwrap();
            assert_eq!(id, RepoId::new("octocat", "hello-world"));
        }

        #[test]
        fn from_str_rejects_malformed() {
            assert!("".parse::<RepoId>().is_err());
            assert!("no-slash".parse::<RepoId>().is_err());
            assert!("/repo".parse::<RepoId>().is_err());
            assert!("owner/".parse::<RepoId>().is_err());
            assert!("a/b/c".parse::<RepoId>().is_err());
        }

        #[test]
        fn display_format() {
            let id = RepoId::new("octocat", "hello-world");
            assert_eq!(format!("{}", id), "octocat/hello-world");
        }
    }
}
