//! MobilityGraph CLI library.
//!
//! Output formatting and terminal styling shared by the command handlers of
//! the `mobilitygraph-cli` binary.

pub mod output;
pub mod terminal;
