//! Trigger decoding: turning the CI runner's push payload into a
//! `BaseBranchEvent`.

pub mod parser;

pub use parser::{TriggerError, load_push_event, parse_push_payload};
