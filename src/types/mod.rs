//! Core domain types for the cascade bot.

pub mod event;
pub mod ids;
pub mod pr;

pub use event::BaseBranchEvent;
pub use ids::{InvalidRepoId, InvalidSha, PrNumber, RepoId, Sha};
pub use pr::{BranchFreshness, PrSummary};
