//! Display formatting for terminal output
//!
//! Provides utilities for formatting engine results for terminal display.

pub mod envelope;
pub mod history;

pub use envelope::{format_envelope_details, format_envelope_list};
pub use history::format_history;
