//! Shared helpers for integration tests
//!
//! - [`fixtures`] - hand-built frames and growth lines
//! - [`audit`] - checks a solved ILP against the tracking constraints

pub mod audit;
pub mod fixtures;
