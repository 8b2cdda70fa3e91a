//! Signal generation: fuses trend, lagged average and levels into a proposal.
//!
//! The generator is portfolio-agnostic: it sees only the latest-bar snapshot
//! derived from the series, never positions or previously sent signals.

pub mod generator;

pub use generator::{generate, nearest_level, Proposal, Rule, Snapshot};
