//! Common utilities for integration tests

#![allow(dead_code)]

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_models::{ExponentialDecay, LinearTransfer};
pub use test_helpers::{all_non_negative, assert_totals_close, relative_error, small_config};
