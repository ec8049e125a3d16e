//! Environment-driven configuration.
//!
//! Read once per invocation; nothing is cached across runs. Which branches
//! are watched is a configuration value handed to each run, not state the
//! bot accumulates.
//!
//! Variables:
//! - `CASCADE_REPO` (fallback `GITHUB_REPOSITORY`) - `owner/repo`
//! - `CASCADE_GITHUB_TOKEN` (fallback `GITHUB_TOKEN`) - opaque bearer
//!   credential, minted externally per run
//! - `CASCADE_WATCHED_BRANCHES` - comma-separated branch patterns, exact
//!   names or trailing-`*` prefixes (default `main`)

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::types::RepoId;

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid {var}: {message}")]
    InvalidVar { var: &'static str, message: String },
}

/// A branch pattern: an exact name, or a prefix ending in `*`
/// (e.g. `release/*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPattern(String);

impl BranchPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        BranchPattern(pattern.into())
    }

    /// Returns true if the branch matches this pattern.
    pub fn matches(&self, branch: &str) -> bool {
        match self.0.strip_suffix('*') {
            Some(prefix) => branch.starts_with(prefix),
            None => branch == self.0,
        }
    }
}

impl FromStr for BranchPattern {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BranchPattern::new(s))
    }
}

impl fmt::Display for BranchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses a comma-separated pattern list, ignoring empty entries.
pub fn parse_patterns(raw: &str) -> Vec<BranchPattern> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(BranchPattern::new)
        .collect()
}

/// Configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// The repository all effects are scoped to.
    pub repo: RepoId,

    /// The bearer credential for this run. Never persisted.
    pub token: String,

    /// Base branches the cascade watches.
    pub watched: Vec<BranchPattern>,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let repo_raw = lookup("CASCADE_REPO")
            .or_else(|| lookup("GITHUB_REPOSITORY"))
            .ok_or(ConfigError::MissingVar("CASCADE_REPO"))?;
        let repo = repo_raw
            .parse::<RepoId>()
            .map_err(|e| ConfigError::InvalidVar {
                var: "CASCADE_REPO",
                message: e.to_string(),
            })?;

        let token = lookup("CASCADE_GITHUB_TOKEN")
            .or_else(|| lookup("GITHUB_TOKEN"))
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingVar("CASCADE_GITHUB_TOKEN"))?;

        let watched = match lookup("CASCADE_WATCHED_BRANCHES") {
            Some(raw) => {
                let patterns = parse_patterns(&raw);
                if patterns.is_empty() {
                    return Err(ConfigError::InvalidVar {
                        var: "CASCADE_WATCHED_BRANCHES",
                        message: format!("{:?} contains no branch patterns", raw),
                    });
                }
                patterns
            }
            None => vec![BranchPattern::new("main")],
        };

        Ok(Config {
            repo,
            token,
            watched,
        })
    }

    /// Returns true if any watched pattern matches the branch.
    pub fn is_watched(&self, branch: &str) -> bool {
        self.watched.iter().any(|p| p.matches(branch))
    }
}
