//! Effects-as-data for GitHub operations.
//!
//! The cascade reducer returns and consumes effect values instead of calling
//! the API directly. This keeps the core logic pure and lets tests run the
//! whole cascade against a scripted interpreter.

pub mod github;
pub mod interpreter;

pub use github::{GitHubEffect, GitHubResponse};
pub use interpreter::GitHubInterpreter;
